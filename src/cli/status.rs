//! Status command handler
//!
//! Shows version, configuration and, optionally, a running server's state.

use crate::config::Config;
use crate::error::Result;
use crate::server::routes::StatusResponse;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    println!("poi-median v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Config: {}", Config::config_path()?.display());
    println!(
        "Page size: {}, format: {}, sort: {} {}",
        config.defaults.page_size,
        config.defaults.format,
        config.defaults.sort_by,
        config.defaults.direction
    );
    if config.source.url.is_empty() {
        println!("Source: not configured");
    } else {
        println!("Source: {}", config.source.url);
    }
    println!();

    if args.server {
        check_server_status(&config).await;
    }

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if !response.status().is_success() {
                println!("Server: ERROR (status {})", response.status());
                return;
            }

            println!("Server: RUNNING on {}", config.server_addr());
            match response.json::<StatusResponse>().await {
                Ok(status) => {
                    println!("  Version: {}", status.version);
                    println!("  Uptime: {}s", status.uptime_secs);
                    match status.analysis {
                        Some(run) => println!(
                            "  Analysis: {} ({} records, {})",
                            run.id,
                            run.records,
                            run.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                        ),
                        None => println!("  Analysis: none loaded"),
                    }
                }
                Err(e) => println!("  Unreadable status response: {}", e),
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
}
