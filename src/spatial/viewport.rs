//! Map viewport derived from a spatial summary
//!
//! Map collaborators own zoom selection; this is the shared helper they
//! use so every surface agrees on it.

use crate::config::MapConfig;
use crate::constants::map::{REFERENCE_ZOOM, MIN_FOCUS_ZOOM, ZOOM_REFERENCE_RADIUS_METERS};
use crate::spatial::{Coordinates, SpatialSummary};
use serde::{Deserialize, Serialize};

/// Map center and zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: f64,
    /// Focus circle radius, absent for the default view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
}

impl Viewport {
    /// Viewport for a summary, or the configured default view without one
    pub fn for_summary(summary: Option<&SpatialSummary>, map: &MapConfig) -> Self {
        match summary {
            Some(summary) => Self {
                center: summary.centroid,
                zoom: zoom_for_radius(summary.radius_meters),
                radius_meters: Some(summary.radius_meters),
            },
            None => Self::default_view(map),
        }
    }

    /// The configured default view
    pub fn default_view(map: &MapConfig) -> Self {
        Self {
            center: Coordinates::new(map.center_lat, map.center_lng),
            zoom: map.zoom,
            radius_meters: None,
        }
    }
}

/// Zoom level for a focus radius: `max(10, 16 - log2(radius / 100))`
pub fn zoom_for_radius(radius_meters: f64) -> f64 {
    (REFERENCE_ZOOM - (radius_meters / ZOOM_REFERENCE_RADIUS_METERS).log2()).max(MIN_FOCUS_ZOOM)
}
