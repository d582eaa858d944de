//! qws command-line entry point.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::warn;

use qws::config::{BrokerConfig, ConfigOverrides};
use qws::queue::QueueContainer;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// In-memory queue web server with long-poll dequeue.
#[derive(Debug, Parser)]
#[command(name = "qws", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interval in seconds to check for expired elements (0 disables)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Require this API token on every route except /health
    #[arg(long)]
    token: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn resolve_config(&self) -> Result<BrokerConfig> {
        let base = match &self.config {
            Some(path) => BrokerConfig::load_from(path)?,
            None => BrokerConfig::default(),
        };

        Ok(base.with_overrides(ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            interval_secs: self.interval,
            token: self.token.clone(),
        }))
    }
}

/// Initialize stdout logging. `RUST_LOG` overrides the default `info` filter.
fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.resolve_config()?;
    let validation = config.validate()?;
    if validation.has_warnings() {
        for warning in &validation.warnings {
            warn!("{warning}");
        }
        warn!(count = validation.warnings.len(), "Starting with configuration warnings");
    }

    qws::server::serve(&config, QueueContainer::new()).await
}
