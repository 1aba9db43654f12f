//! POI records, outcome categories and datasets
//!
//! This module handles:
//! - Classifying raw analysis labels into outcome categories
//! - Normalizing backend payloads into immutable datasets
//! - Aggregating per-category statistics

pub mod ingest;
pub mod label;
pub mod stats;


use crate::constants::display::UNNAMED;
use crate::spatial::Coordinates;
use label::LabelCode;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Outcome category assigned to a flagged POI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The POI no longer exists at all
    NonExistent,
    /// The POI exists but sits at the wrong place
    WrongLocation,
    /// The POI location is invalid (e.g. on the median itself)
    InvalidLocation,
    /// The POI is legitimately on the median
    RuleException,
    /// The label could not be mapped
    Unknown,
}

impl Category {
    /// Whether this outcome counts as a valid POI
    ///
    /// Rule exceptions need no correction; every other category does, and
    /// `Unknown` is never counted as valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::RuleException)
    }

    /// Human-readable description of the outcome
    pub fn description(&self) -> &'static str {
        match self {
            Self::NonExistent => "POI does not exist",
            Self::WrongLocation => "POI exists but is in the wrong location",
            Self::InvalidLocation => "POI location is invalid",
            Self::RuleException => "POI is a legitimate exception to the rule",
            Self::Unknown => "Label could not be classified",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonExistent => write!(f, "non_existent"),
            Self::WrongLocation => write!(f, "wrong_location"),
            Self::InvalidLocation => write!(f, "invalid_location"),
            Self::RuleException => write!(f, "rule_exception"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "non_existent" | "nonexistent" => Ok(Self::NonExistent),
            "wrong_location" | "wronglocation" => Ok(Self::WrongLocation),
            "invalid_location" | "invalidlocation" => Ok(Self::InvalidLocation),
            "rule_exception" | "ruleexception" => Ok(Self::RuleException),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// List all outcome categories in display order
pub fn all_categories() -> [Category; 5] {
    [
        Category::NonExistent,
        Category::WrongLocation,
        Category::InvalidLocation,
        Category::RuleException,
        Category::Unknown,
    ]
}

/// Data quality of a single record after ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordQuality {
    /// Coordinates usable and record classified
    Ok,
    /// Coordinates unusable; still classified
    Malformed,
    /// Tagged erroneous upstream; excluded from classification
    Error,
}

/// One parsed point of interest
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub id: String,
    pub name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Label exactly as received
    pub raw_label: Option<serde_json::Value>,
    pub distance_meters: Option<f64>,
    pub error: Option<String>,
    pub quality: RecordQuality,
}

impl PoiRecord {
    /// Name for display, falling back to "Unnamed"
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }

    pub fn is_error(&self) -> bool {
        self.quality == RecordQuality::Error
    }

    pub fn is_malformed(&self) -> bool {
        self.quality == RecordQuality::Malformed
    }

    /// Parsed form of the raw label
    pub fn label_code(&self) -> LabelCode {
        LabelCode::from_value(self.raw_label.as_ref())
    }

    /// Outcome category, or `None` for error-tagged records
    ///
    /// Always derived from `raw_label`, never cached.
    pub fn category(&self) -> Option<Category> {
        if self.is_error() {
            None
        } else {
            Some(self.label_code().classify())
        }
    }

    /// Coordinates usable for spatial computation
    pub fn coordinates(&self) -> Option<Coordinates> {
        if self.quality != RecordQuality::Ok {
            return None;
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }
}

impl Serialize for PoiRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PoiRecord", 10)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", self.display_name())?;
        state.serialize_field("latitude", &self.latitude)?;
        state.serialize_field("longitude", &self.longitude)?;
        state.serialize_field("label", &self.raw_label)?;
        state.serialize_field("category", &self.category())?;
        state.serialize_field("distance_meters", &self.distance_meters)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("quality", &self.quality)?;
        state.end()
    }
}

/// Ordered, immutable collection of POI records keyed by id
///
/// Payload order is kept as the default ordering. Build a new dataset to
/// reflect new analysis results; there is no way to mutate one in place.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<PoiRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset from records in order
    ///
    /// A repeated id replaces the earlier record in its original slot, so
    /// ids stay unique.
    pub fn from_records(records: impl IntoIterator<Item = PoiRecord>) -> Self {
        let mut dataset = Self::default();
        for record in records {
            match dataset.index.get(&record.id) {
                Some(&slot) => dataset.records[slot] = record,
                None => {
                    dataset.index.insert(record.id.clone(), dataset.records.len());
                    dataset.records.push(record);
                }
            }
        }
        dataset
    }

    /// All records in payload order
    pub fn records(&self) -> &[PoiRecord] {
        &self.records
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&PoiRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoiRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a PoiRecord;
    type IntoIter = std::slice::Iter<'a, PoiRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
