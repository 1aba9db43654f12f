//! Spatial summaries over POI subsets
//!
//! Computes a centroid and an enclosing focus radius for any set of records,
//! for map focus and zoom.
//!
//! ## Accuracy
//! Distances use a small-area planar approximation (111 km per degree, with
//! longitude scaled by the cosine of the centroid latitude). Error stays
//! negligible at city scale but grows with extent and near the poles; it
//! is not a geodesic computation.

pub mod viewport;

use crate::constants::geo::{
    METERS_PER_DEGREE, MIN_SUMMARY_RADIUS_METERS, SUMMARY_RADIUS_SLACK,
};
use crate::poi::PoiRecord;
use serde::{Deserialize, Serialize};

pub use viewport::Viewport;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Centroid and focus radius of a POI subset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialSummary {
    pub centroid: Coordinates,
    pub radius_meters: f64,
    /// Number of records that contributed
    pub count: usize,
}

/// Planar-approximate distance in meters
///
/// `reference_lat` sets the longitude scale; pass the centroid latitude.
pub fn planar_distance(from: Coordinates, to: Coordinates, reference_lat: f64) -> f64 {
    let meters_per_deg_lng = METERS_PER_DEGREE * reference_lat.to_radians().cos();

    let dy = (to.lat - from.lat) * METERS_PER_DEGREE;
    let dx = (to.lng - from.lng) * meters_per_deg_lng;

    dx.hypot(dy)
}

/// Summarize a set of records
///
/// Malformed and error-tagged records are skipped. Returns `None` when
/// nothing is left; callers render their default viewport in that case.
///
/// # Algorithm
/// 1. Centroid: unweighted mean of latitude and of longitude
/// 2. Distance from centroid to each member via `planar_distance`
/// 3. Radius: `max(500, 1.2 * farthest)`
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a PoiRecord>) -> Option<SpatialSummary> {
    let points: Vec<Coordinates> = records
        .into_iter()
        .filter_map(PoiRecord::coordinates)
        .collect();
    summarize_points(&points)
}

/// Summarize raw coordinates
pub fn summarize_points(points: &[Coordinates]) -> Option<SpatialSummary> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let centroid = Coordinates::new(
        points.iter().map(|p| p.lat).sum::<f64>() / n,
        points.iter().map(|p| p.lng).sum::<f64>() / n,
    );

    let farthest = points
        .iter()
        .map(|p| planar_distance(centroid, *p, centroid.lat))
        .fold(0.0_f64, f64::max);

    Some(SpatialSummary {
        centroid,
        radius_meters: (SUMMARY_RADIUS_SLACK * farthest).max(MIN_SUMMARY_RADIUS_METERS),
        count: points.len(),
    })
}
