//! Centralized constants for the poi-median crate
//!
//! Values shared between the summary engine, the viewport helper and the
//! output layers live here so they cannot drift apart.

/// Geographic constants
pub mod geo {
    /// Meters per degree used by the small-area planar approximation
    pub const METERS_PER_DEGREE: f64 = 111_000.0;

    /// Smallest focus radius a spatial summary may report, in meters
    pub const MIN_SUMMARY_RADIUS_METERS: f64 = 500.0;

    /// Slack applied to the farthest member so markers never sit on the boundary
    pub const SUMMARY_RADIUS_SLACK: f64 = 1.2;
}

/// Map viewport constants
pub mod map {
    /// Zoom level for a focus radius of `ZOOM_REFERENCE_RADIUS_METERS`
    pub const REFERENCE_ZOOM: f64 = 16.0;

    /// Lowest zoom a focus area is ever rendered at
    pub const MIN_FOCUS_ZOOM: f64 = 10.0;

    /// Radius that maps to `REFERENCE_ZOOM`; every doubling drops one level
    pub const ZOOM_REFERENCE_RADIUS_METERS: f64 = 100.0;
}

/// Display constants
pub mod display {
    /// Label shown for records without a name
    pub const UNNAMED: &str = "Unnamed";
}
