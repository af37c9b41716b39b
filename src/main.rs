use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use weather_decision::{ActivityConfig, AppState, telemetry, web};

/// Journey Builder custom decision activity branching contacts on the weather
#[derive(Debug, Parser)]
#[command(name = "weather-decision", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ActivityConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
        config.validate()?;
    }

    telemetry::init_tracing(&config.logging)?;

    info!(
        "Starting weather decision activity v{}",
        weather_decision::VERSION
    );
    if let Err(e) = config.ensure_execute_ready() {
        warn!("{}; /execute will answer 500 until this is fixed", e);
    }

    let state = AppState::new(config)?;
    web::run(state).await
}
