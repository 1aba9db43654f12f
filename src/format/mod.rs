//! Output formatters
//!
//! Provides trait-based output formatting for analysis reports.

pub mod geojson;
pub mod json;
pub mod text;
pub mod url;

use crate::analysis::AnalysisReport;
use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format an analysis report
    ///
    /// # Arguments
    /// * `report` - The report to format
    /// * `config` - Application config (for url providers, etc.)
    fn format(&self, report: &AnalysisReport<'_>, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "geojson" => Some(Box::new(geojson::GeoJsonFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    ["json", "text", "geojson", "url"]
        .iter()
        .filter_map(|name| get_formatter(name))
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_analysis() -> crate::analysis::Analysis {
    crate::analysis::Analysis::from_value(serde_json::json!({
        "p1": {"POI_NAME": "Oxxo", "x_cord": -103.39, "y_cord": 20.72, "label": "2.1", "distance": 4.25},
        "p2": {"x_cord": -103.40, "y_cord": 20.73, "label": "4.0"},
        "p3": {"error": "bad row"},
        "p4": {"x_cord": "12.5", "y_cord": "foo", "label": 1}
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("geojson").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("gpx").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GeoJSON").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "geojson"));
        assert!(formats.iter().all(|f| !f.description.is_empty()));
    }
}
