//! Analysis runs
//!
//! An `Analysis` is one immutable snapshot of a backend payload: the
//! normalized dataset plus its statistics and overall spatial summary.
//! Re-analysis builds a new run; nothing mutates an existing one.

use crate::config::MapConfig;
use crate::error::Result;
use crate::poi::ingest::{self, RawPayload};
use crate::poi::stats::{aggregate, CategoryStats};
use crate::poi::Dataset;
use crate::query::{self, QueryPage, QueryParams};
use crate::spatial::{summarize, SpatialSummary, Viewport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// One ingested analysis payload
#[derive(Debug, Clone)]
pub struct Analysis {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub dataset: Dataset,
    pub stats: CategoryStats,
    /// Summary over every locatable record
    pub summary: Option<SpatialSummary>,
}

impl Analysis {
    /// Build a run from an already-parsed payload
    pub fn from_payload(raw: &RawPayload) -> Self {
        let dataset = ingest::normalize(raw);
        let stats = aggregate(&dataset);
        let summary = summarize(&dataset);

        let analysis = Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            dataset,
            stats,
            summary,
        };

        info!(
            "Analysis {}: {} records, {} classified, {} errors, {} malformed",
            analysis.id,
            analysis.dataset.len(),
            analysis.stats.total,
            analysis.stats.error_count,
            analysis.stats.malformed_count
        );

        analysis
    }

    /// Parse and ingest a JSON payload document
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::from_payload(&ingest::parse_payload(text)?))
    }

    /// Parse and ingest an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(Self::from_payload(&ingest::payload_from_value(value)?))
    }

    /// Spatial summary of the records a query selects (ignoring pagination)
    pub fn focus(&self, params: &QueryParams) -> Option<SpatialSummary> {
        summarize(self.dataset.iter().filter(|r| params.matches(r)))
    }

    /// Build a report for one query over this run
    pub fn report<'a>(&'a self, params: &QueryParams, map: &MapConfig) -> AnalysisReport<'a> {
        let summary = self.focus(params);

        AnalysisReport {
            id: &self.id,
            created_at: self.created_at,
            stats: self.stats,
            query: params.clone(),
            summary,
            viewport: Viewport::for_summary(summary.as_ref(), map),
            page: query::query(&self.dataset, params),
        }
    }
}

/// Serializable view of a run for one query
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub id: &'a str,
    pub created_at: DateTime<Utc>,
    /// Statistics over the whole run
    pub stats: CategoryStats,
    pub query: QueryParams,
    /// Summary of the filtered records
    pub summary: Option<SpatialSummary>,
    pub viewport: Viewport,
    pub page: QueryPage<'a>,
}
