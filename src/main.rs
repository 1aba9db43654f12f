//! poi-median CLI entry point
//!
//! Median-analysis results explorer - CLI + web API

use poi_median::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
