#![allow(missing_docs)]

mod cli;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "sentinelctl", about = "Sentinel traffic monitoring console")]
struct Cli {
    /// Env file read before the process environment
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print live events and a periodic health summary
    Watch {
        /// Only show events for this camera id
        #[arg(long)]
        camera: Option<String>,
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        summary_every: Duration,
    },
    /// Validate low-confidence detections from the terminal
    Triage,
    /// Play one stream with automatic reconnects and print status changes
    Probe {
        url: Url,
        /// Camera id shown in logs
        #[arg(long, default_value = "probe")]
        camera: String,
    },
    /// Load and validate configuration, then print the resolved settings
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with event output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Watch {
            camera,
            summary_every,
        } => {
            let config = cli::load_config(&cli.env_file)?;
            cli::watch::run(config, camera, summary_every).await
        }
        Command::Triage => {
            let config = cli::load_config(&cli.env_file)?;
            cli::triage::run(config).await
        }
        Command::Probe { url, camera } => {
            let config = cli::load_config(&cli.env_file)?;
            cli::probe::run(url, camera, config.player.backoff_cap).await
        }
        Command::Check => cli::check::run(&cli.env_file),
    }
}
