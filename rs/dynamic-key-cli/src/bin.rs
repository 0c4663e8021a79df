mod log;

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dynamic_key::{Config, NEVER_EXPIRES, Token};
use serde::Serialize;

#[derive(Parser, Clone)]
#[command(name = "dynamic-key", about = "Generate and verify protocol 003 dynamic keys")]
struct Cli {
	#[command(flatten)]
	log: log::Log,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
	/// Generate a token and print it to stdout.
	Generate(GenerateArgs),

	/// Check a token's signature and expiry.
	Verify {
		#[command(flatten)]
		credentials: Credentials,

		/// The channel the token was issued for.
		#[arg(long)]
		channel: String,

		/// The token to verify.
		token: String,
	},

	/// Print the decoded fields of a token as JSON, without checking the signature.
	Inspect {
		token: String,
	},
}

#[derive(Args, Clone)]
struct Credentials {
	/// Load the app id, certificate, and expiration from a TOML file; takes precedence over the flags below.
	#[arg(long)]
	config: Option<PathBuf>,

	#[arg(long, env = "DYNAMIC_KEY_APP_ID")]
	app_id: Option<String>,

	#[arg(long, env = "DYNAMIC_KEY_APP_CERTIFICATE", hide_env_values = true)]
	app_certificate: Option<String>,
}

impl Credentials {
	fn load(self) -> anyhow::Result<Config> {
		if let Some(path) = self.config {
			return Config::load(path);
		}

		let app_certificate = self.app_certificate.context("missing --app-certificate or --config")?;
		Ok(Config::new(self.app_id.unwrap_or_default(), app_certificate))
	}
}

#[derive(Args, Clone)]
struct GenerateArgs {
	#[command(flatten)]
	credentials: Credentials,

	#[arg(long)]
	channel: String,

	/// The user id; only the low 32 bits are used.
	#[arg(long, default_value_t = 0, allow_negative_numbers = true)]
	uid: i64,

	/// The salt, random if omitted.
	#[arg(long)]
	salt: Option<u32>,

	/// Unix timestamp of issue, now if omitted.
	#[arg(long)]
	issued_at: Option<u32>,

	/// Absolute unix expiry; 4294967295 never expires.
	#[arg(long, conflicts_with = "valid_for")]
	expires_at: Option<u32>,

	/// How long the token is valid, ex. `1h` or `30m`. Defaults to the configured expiration.
	#[arg(long, value_parser = humantime::parse_duration)]
	valid_for: Option<Duration>,

	/// Issue a token that never expires.
	#[arg(long, conflicts_with_all = ["expires_at", "valid_for"])]
	never_expires: bool,
}

impl GenerateArgs {
	fn run(self) -> anyhow::Result<String> {
		let config = self.credentials.load()?;

		let issued_at = match self.issued_at {
			Some(issued_at) => issued_at,
			None => dynamic_key::now()?,
		};

		let expires_at = if self.never_expires {
			NEVER_EXPIRES
		} else if let Some(expires_at) = self.expires_at {
			expires_at
		} else {
			dynamic_key::expires_after(issued_at, self.valid_for.unwrap_or(config.expiration))
		};

		let salt = self.salt.unwrap_or_else(rand::random);

		let token = dynamic_key::generate(
			&config.app_id,
			&config.app_certificate,
			&self.channel,
			issued_at,
			salt,
			self.uid,
			expires_at,
		)?;

		Ok(token)
	}
}

#[derive(Serialize)]
struct Inspect<'a> {
	version: &'static str,
	signature: String,
	app_id: &'a str,
	issued_at: u32,
	salt: String,
	uid: u32,
	expires_at: u32,
	never_expires: bool,
}

impl<'a> From<&'a Token> for Inspect<'a> {
	fn from(token: &'a Token) -> Self {
		Self {
			version: dynamic_key::VERSION,
			signature: token.signature.to_string(),
			app_id: &token.app_id,
			issued_at: token.fields.issued_at,
			salt: format!("{:08x}", token.fields.salt),
			uid: token.fields.uid,
			expires_at: token.fields.expires_at,
			never_expires: token.never_expires(),
		}
	}
}

fn verify(credentials: Credentials, channel: &str, token: &str) -> anyhow::Result<()> {
	let config = credentials.load()?;
	let token: Token = token.parse().context("failed to decode token")?;

	if !config.app_id.is_empty() && config.app_id != token.app_id {
		anyhow::bail!("token was issued for app {:?}", token.app_id);
	}

	let now = u64::from(dynamic_key::now()?);
	token.verify(&config.app_certificate, channel, now).context("token rejected")?;

	tracing::info!(channel, uid = token.fields.uid, expires_at = token.fields.expires_at, "token valid");
	Ok(())
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	cli.log.init();

	match cli.command {
		Command::Generate(args) => {
			let token = args.run()?;
			println!("{token}");
		}
		Command::Verify {
			credentials,
			channel,
			token,
		} => {
			verify(credentials, &channel, &token)?;
			println!("ok");
		}
		Command::Inspect { token } => {
			let token: Token = token.parse().context("failed to decode token")?;
			println!("{}", serde_json::to_string_pretty(&Inspect::from(&token))?);
		}
	}

	Ok(())
}
