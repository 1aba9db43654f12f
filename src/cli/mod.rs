//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod analyze;
pub mod config;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Median-analysis results explorer
#[derive(Parser)]
#[command(name = "poi-median")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize, filter and page analysis results
    Analyze(analyze::AnalyzeArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show version, config and server status
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            init_logging("warn");
            analyze::run(args).await
        }
        Commands::Serve(args) => {
            init_logging("info");
            serve::run(args).await
        }
        Commands::Config(args) => {
            init_logging("warn");
            config::run(args)
        }
        Commands::Status(args) => {
            init_logging("warn");
            status::run(args).await
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
