use clap::Args;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Args, Clone, Debug)]
pub struct Log {
	/// The default log level; `RUST_LOG` directives take precedence.
	#[arg(long = "log-level", env = "DYNAMIC_KEY_LOG_LEVEL", default_value = "warn")]
	pub level: LevelFilter,
}

impl Log {
	pub fn init(&self) {
		let filter = EnvFilter::builder()
			.with_default_directive(self.level.into())
			.from_env_lossy();

		tracing_subscriber::fmt()
			.with_writer(std::io::stderr)
			.with_env_filter(filter)
			.init();
	}
}
