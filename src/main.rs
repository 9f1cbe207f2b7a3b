use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memory_center::InMemoryStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use perceiver_screen::OcrEngine;
use webpilot::drivers::SimulatedSessionFactory;
use webpilot::{AppConfig, CommandRunner};

#[derive(Parser)]
#[command(name = "webpilot", version, about = "Closed-loop browser automation core")]
struct Cli {
    /// User id for context and history
    #[arg(long, default_value = "local")]
    user: String,

    /// Path to a config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan and execute one command (dry-run against the simulated driver)
    Run {
        /// The command, e.g. "Search Google for cats"
        command: String,
    },
    /// Pursue a goal with the autonomous loop
    Goal {
        /// The goal to pursue
        goal: String,

        /// Override the iteration ceiling
        #[arg(long)]
        max_iterations: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(path) => AppConfig::load_from(Some(path)).context("loading config file")?,
        None => AppConfig::load().context("loading config")?,
    };

    #[cfg(feature = "ocr")]
    let ocr: Arc<dyn OcrEngine> = Arc::new(perceiver_screen::TesseractOcr::new());
    #[cfg(not(feature = "ocr"))]
    let ocr: Arc<dyn OcrEngine> = Arc::new(webpilot::drivers::NoopOcr);

    let runner = CommandRunner::new(
        Arc::new(SimulatedSessionFactory),
        Arc::new(InMemoryStore::new()),
        ocr,
    );

    match cli.command {
        Commands::Run { command } => {
            let runner = runner.with_config(config);
            let result = runner.run_command(&cli.user, &command).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Goal {
            goal,
            max_iterations,
        } => {
            if let Some(ceiling) = max_iterations {
                config.max_iterations = ceiling;
            }
            let runner = runner.with_config(config);

            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("cancellation requested");
                    ctrl_c_token.cancel();
                }
            });

            let result = runner.run_goal(&cli.user, &goal, cancel).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
