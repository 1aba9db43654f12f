//! GeoJSON output formatter
//!
//! One Point feature per locatable record on the current page. Records
//! without usable coordinates are left out of the features and counted in
//! the `unlocated` member. The focus circle travels as foreign members.

use crate::analysis::AnalysisReport;
use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::poi::PoiRecord;
use serde_json::{json, Value};

/// GeoJSON formatter - outputs a FeatureCollection for map layers
pub struct GeoJsonFormatter;

impl OutputFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "GeoJSON FeatureCollection of the current page"
    }

    fn format(&self, report: &AnalysisReport<'_>, _config: &Config) -> Result<String> {
        let features: Vec<Value> = report
            .page
            .items
            .iter()
            .filter_map(|record| feature(record))
            .collect();
        let unlocated = report.page.items.len() - features.len();

        let collection = json!({
            "type": "FeatureCollection",
            "features": features,
            "unlocated": unlocated,
            "focus": report.summary,
            "viewport": report.viewport,
        });

        Ok(serde_json::to_string_pretty(&collection)?)
    }
}

/// Point feature for a record; GeoJSON positions are [lng, lat]
fn feature(record: &PoiRecord) -> Option<Value> {
    let coords = record.coordinates()?;

    Some(json!({
        "type": "Feature",
        "id": record.id,
        "geometry": {
            "type": "Point",
            "coordinates": [coords.lng, coords.lat],
        },
        "properties": {
            "name": record.display_name(),
            "label": record.raw_label,
            "category": record.category(),
            "valid": record.category().is_some_and(|c| c.is_valid()),
            "distance_meters": record.distance_meters,
        },
    }))
}
