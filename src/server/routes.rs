//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::analysis::Analysis;
use crate::config::Config;
use crate::error::Error;
use crate::poi::all_categories;
use crate::poi::stats::{aggregate_records, CategoryStats};
use crate::query::{self, QueryParams};
use crate::server::state::AppState;
use crate::spatial::{SpatialSummary, Viewport};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Largest accepted analysis payload
const MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Largest page a client may request
const MAX_PAGE_SIZE: usize = 1000;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/categories", get(categories_handler))
        .route(
            "/api/analysis",
            get(get_analysis_handler)
                .post(create_analysis_handler)
                .delete(delete_analysis_handler),
        )
        .route("/api/pois", get(pois_handler))
        .route("/api/pois/:id", get(poi_handler))
        .route("/api/summary", get(summary_handler))
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiFailure = (StatusCode, Json<ApiError>);

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    fn with_status(self, status: StatusCode) -> ApiFailure {
        (status, Json(self))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidPayload(_) | Error::Json(_) => "INVALID_PAYLOAD",
            Error::InvalidQuery(_) => "INVALID_QUERY",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

fn no_analysis() -> ApiFailure {
    ApiError::new("NO_ANALYSIS", "No analysis results loaded").with_status(StatusCode::NOT_FOUND)
}

fn config_failure(err: Error) -> ApiFailure {
    ApiError::from(err).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Query-string parameters shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PoiQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PoiQuery {
    /// Resolve against configured defaults
    fn to_params(&self, config: &Config) -> Result<QueryParams, ApiFailure> {
        let invalid = |e: String| {
            ApiError::from(Error::InvalidQuery(e)).with_status(StatusCode::BAD_REQUEST)
        };

        let mut params = QueryParams::from_config(config).map_err(config_failure)?;

        if let Some(status) = &self.status {
            params.status = status.parse().map_err(invalid)?;
        }
        if let Some(search) = &self.search {
            params.search = search.clone();
        }
        if let Some(sort_by) = &self.sort_by {
            params.sort_by = sort_by.parse().map_err(invalid)?;
        }
        if let Some(direction) = &self.direction {
            params.direction = direction.parse().map_err(invalid)?;
        }
        if let Some(page_size) = self.page_size {
            if page_size == 0 || page_size > MAX_PAGE_SIZE {
                return Err(invalid(format!(
                    "page_size must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
            params.page_size = page_size;
        }
        if let Some(page) = self.page {
            params.set_page(page);
        }

        Ok(params)
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Liveness probe
///
/// GET /api/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Currently loaded run, if any
    pub analysis: Option<RunInfo>,
}

/// Identity of a loaded run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub records: usize,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let analysis = state.current().await.map(|run| RunInfo {
        id: run.id.clone(),
        created_at: run.created_at,
        records: run.dataset.len(),
    });

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        analysis,
    })
}

/// Categories list response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub description: String,
    pub valid: bool,
}

/// List outcome categories
///
/// GET /api/categories
async fn categories_handler() -> Json<CategoriesResponse> {
    let categories = all_categories()
        .into_iter()
        .map(|c| CategoryInfo {
            name: c.to_string(),
            description: c.description().to_string(),
            valid: c.is_valid(),
        })
        .collect();

    Json(CategoriesResponse { categories })
}

/// Ingest analysis results, replacing the current run
///
/// POST /api/analysis
async fn create_analysis_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected analysis body: {}", rejection.body_text());
        ApiError::new("INVALID_PAYLOAD", rejection.body_text()).with_status(rejection.status())
    })?;

    let run = Analysis::from_value(payload).map_err(|e| {
        warn!("Rejected analysis payload: {}", e);
        ApiError::from(e).with_status(StatusCode::BAD_REQUEST)
    })?;

    let analysis = state.replace(run).await;
    info!("Loaded analysis {} ({} records)", analysis.id, analysis.dataset.len());

    let config = state.config.read().await;
    let params = QueryParams::from_config(&config).map_err(config_failure)?;

    Ok((
        StatusCode::CREATED,
        Json(analysis.report(&params, &config.map)),
    )
        .into_response())
}

/// Current run report
///
/// GET /api/analysis
async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoiQuery>,
) -> Result<Response, ApiFailure> {
    let analysis = state.current().await.ok_or_else(no_analysis)?;
    let config = state.config.read().await;
    let params = query.to_params(&config)?;

    Ok(Json(analysis.report(&params, &config.map)).into_response())
}

/// Discard the current run
///
/// DELETE /api/analysis
async fn delete_analysis_handler(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiFailure> {
    let removed = state.clear().await.ok_or_else(no_analysis)?;
    info!("Discarded analysis {}", removed.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Paged, filtered, sorted POI table
///
/// GET /api/pois
async fn pois_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoiQuery>,
) -> Result<Response, ApiFailure> {
    let analysis = state.current().await.ok_or_else(no_analysis)?;
    let params = query.to_params(&*state.config.read().await)?;

    Ok(Json(query::query(&analysis.dataset, &params)).into_response())
}

/// Single POI record
///
/// GET /api/pois/:id
async fn poi_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiFailure> {
    let analysis = state.current().await.ok_or_else(no_analysis)?;

    match analysis.dataset.get(&id) {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(ApiError::new("NOT_FOUND", format!("POI not found: {}", id))
            .with_status(StatusCode::NOT_FOUND)),
    }
}

/// Summary of a filtered subset
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Stats over the filtered records
    pub stats: CategoryStats,
    /// `None` when nothing in the subset has usable coordinates
    pub summary: Option<SpatialSummary>,
    pub viewport: Viewport,
}

/// Map focus for the records a query selects
///
/// GET /api/summary
async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoiQuery>,
) -> Result<Json<SummaryResponse>, ApiFailure> {
    let analysis = state.current().await.ok_or_else(no_analysis)?;
    let config = state.config.read().await;
    let params = query.to_params(&config)?;

    let stats = aggregate_records(analysis.dataset.iter().filter(|r| params.matches(r)));
    let summary = analysis.focus(&params);

    Ok(Json(SummaryResponse {
        stats,
        summary,
        viewport: Viewport::for_summary(summary.as_ref(), &config.map),
    }))
}
