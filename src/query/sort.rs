//! Sort keys for the query pipeline
//!
//! Values that parse as finite numbers compare numerically; everything else
//! compares as case-sensitive text. In a column mixing both, numbers sort
//! before text so the ordering stays total.

use crate::poi::PoiRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sortable record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Label,
    Category,
    Latitude,
    Longitude,
    Distance,
}

impl SortField {
    /// Extract this field's sort key from a record
    pub fn key(&self, record: &PoiRecord) -> SortKey {
        match self {
            Self::Id => SortKey::from_text(&record.id),
            Self::Name => SortKey::from_text(record.display_name()),
            Self::Label => match &record.raw_label {
                Some(serde_json::Value::String(s)) => SortKey::from_text(s),
                Some(serde_json::Value::Number(n)) => SortKey::from_number(n.as_f64()),
                Some(other) => SortKey::from_text(&other.to_string()),
                None => SortKey::Missing,
            },
            Self::Category => match record.category() {
                Some(category) => SortKey::Text(category.to_string()),
                None => SortKey::Missing,
            },
            Self::Latitude => SortKey::from_number(record.latitude),
            Self::Longitude => SortKey::from_number(record.longitude),
            Self::Distance => SortKey::from_number(record.distance_meters),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Name => write!(f, "name"),
            Self::Label => write!(f, "label"),
            Self::Category => write!(f, "category"),
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
            Self::Distance => write!(f, "distance"),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    /// Accepts the payload column names (`POI_NAME`, `x_cord`, ...) as aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "name" | "poi_name" => Ok(Self::Name),
            "label" | "status" => Ok(Self::Label),
            "category" => Ok(Self::Category),
            "latitude" | "lat" | "y_cord" => Ok(Self::Latitude),
            "longitude" | "lng" | "x_cord" => Ok(Self::Longitude),
            "distance" => Ok(Self::Distance),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// A comparable sort key
///
/// Absent and blank values order before everything else, numbers before
/// non-numeric text.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Text that parses as a finite number becomes a numeric key
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Missing;
        }
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(text.to_string()),
        }
    }

    pub fn from_number(value: Option<f64>) -> Self {
        match value {
            Some(n) if n.is_finite() => Self::Number(n),
            _ => Self::Missing,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}
