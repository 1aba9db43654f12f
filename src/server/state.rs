//! Server shared state
//!
//! Holds configuration and the current analysis run.

use crate::analysis::Analysis;
use crate::config::Config;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Current run; swapped whole on re-analysis, never mutated
    current: RwLock<Option<Arc<Analysis>>>,

    started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            current: RwLock::new(None),
            started_at: Instant::now(),
        }
    }

    /// Get the current analysis run
    pub async fn current(&self) -> Option<Arc<Analysis>> {
        self.current.read().await.clone()
    }

    /// Publish a new run, replacing any previous one
    pub async fn replace(&self, analysis: Analysis) -> Arc<Analysis> {
        let analysis = Arc::new(analysis);
        let previous = self.current.write().await.replace(Arc::clone(&analysis));
        if let Some(previous) = previous {
            info!("Analysis {} replaced by {}", previous.id, analysis.id);
        }
        analysis
    }

    /// Discard the current run
    pub async fn clear(&self) -> Option<Arc<Analysis>> {
        self.current.write().await.take()
    }

    /// Seconds since the server started
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
