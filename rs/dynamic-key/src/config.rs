use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::{AppCertificate, Uid, generate_for};

/// Application credentials and token lifetime, usually loaded from a TOML file.
///
/// ```toml
/// app_id = "970ca35de60c44645bbae8a215061b33"
/// app_certificate = "5cfd2fd1755d40ecb72977518be15d3b"
/// expiration = "1h"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub app_id: String,
	pub app_certificate: AppCertificate,

	/// How long issued tokens remain valid.
	#[serde(with = "humantime_serde", default = "default_expiration")]
	pub expiration: Duration,
}

fn default_expiration() -> Duration {
	Duration::from_secs(3600)
}

impl Config {
	pub fn new(app_id: impl Into<String>, app_certificate: impl Into<AppCertificate>) -> Self {
		Self {
			app_id: app_id.into(),
			app_certificate: app_certificate.into(),
			expiration: default_expiration(),
		}
	}

	pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
		let config: Self = toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;

		if config.app_certificate.is_empty() {
			tracing::warn!(path = %path.display(), "empty app certificate");
		}

		Ok(config)
	}

	/// Issue a token for `channel`, valid for [Config::expiration] starting now, with a random salt.
	pub fn issue(&self, channel: &str, uid: impl Uid) -> anyhow::Result<String> {
		let salt = rand::random();
		let token = generate_for(&self.app_id, &self.app_certificate, channel, salt, uid, self.expiration)?;
		tracing::info!(channel, expiration = ?self.expiration, "issued dynamic key");
		Ok(token)
	}
}
