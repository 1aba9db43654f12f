//! poi-median: median-analysis results explorer
//!
//! A library and CLI tool for exploring the output of a POI median
//! analysis: classifying each POI's outcome, aggregating category
//! statistics, summarizing the spatial extent of any subset, and serving
//! filtered, sorted, paged views of the results.
//!
//! ## Features
//!
//! - Outcome classification from raw backend labels
//! - Per-category statistics and validity rate
//! - Centroid + bounding radius for map focus
//! - Filter / search / sort / paginate pipeline
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use poi_median::{Analysis, QueryParams};
//!
//! let payload = r#"{
//!     "p1": {"POI_NAME": "Oxxo", "x_cord": -103.39, "y_cord": 20.72, "label": "2.1"},
//!     "p2": {"x_cord": -103.40, "y_cord": 20.73, "label": "4.0"},
//!     "p3": {"error": "bad row"}
//! }"#;
//!
//! let analysis = Analysis::from_json(payload).unwrap();
//! assert_eq!(analysis.stats.total, 2);
//! assert_eq!(analysis.stats.validity_rate, 0.5);
//!
//! let summary = analysis.focus(&QueryParams::default()).unwrap();
//! println!("Focus radius: {:.0}m", summary.radius_meters);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod poi;
pub mod query;
pub mod server;
pub mod spatial;

// Re-export commonly used types
pub use analysis::Analysis;
pub use config::Config;
pub use error::{Error, Result};
pub use poi::stats::CategoryStats;
pub use poi::{Category, Dataset, PoiRecord};
pub use query::QueryParams;
pub use spatial::{Coordinates, SpatialSummary, Viewport};
