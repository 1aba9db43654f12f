//! Dataset ingest and normalization
//!
//! Converts the analysis backend's `{id: {x_cord, y_cord, label, ...}}`
//! payload into a `Dataset`. Bad rows are quarantined per record and never
//! abort the batch: upstream datasets routinely contain partial errors.

use crate::error::{Error, Result};
use crate::poi::{Dataset, PoiRecord, RecordQuality};
use crate::spatial::Coordinates;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Raw payload: POI id to raw fields, in payload order
pub type RawPayload = Map<String, Value>;

const NAME_FIELD: &str = "POI_NAME";
const LNG_FIELD: &str = "x_cord";
const LAT_FIELD: &str = "y_cord";
const LABEL_FIELD: &str = "label";
const DISTANCE_FIELD: &str = "distance";
const ERROR_FIELD: &str = "error";

/// Parse a payload document
///
/// Accepts the mapping itself or a JSON string that encodes it (some
/// producers double-encode the body).
pub fn parse_payload(text: &str) -> Result<RawPayload> {
    let value: Value = serde_json::from_str(text)?;
    payload_from_value(value)
}

/// Extract the payload mapping from an already-parsed JSON value
pub fn payload_from_value(value: Value) -> Result<RawPayload> {
    match value {
        Value::Object(map) => Ok(map),
        Value::String(inner) => match serde_json::from_str(&inner)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::InvalidPayload(
                "encoded payload is not a JSON object".to_string(),
            )),
        },
        other => Err(Error::InvalidPayload(format!(
            "expected a JSON object keyed by POI id, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Normalize a raw payload into a dataset
pub fn normalize(raw: &RawPayload) -> Dataset {
    let records: Vec<PoiRecord> = raw
        .iter()
        .map(|(id, fields)| normalize_record(id, fields))
        .collect();

    let errors = records.iter().filter(|r| r.is_error()).count();
    let malformed = records.iter().filter(|r| r.is_malformed()).count();
    if errors > 0 || malformed > 0 {
        warn!(
            "Quarantined {} error-tagged and {} malformed of {} records",
            errors,
            malformed,
            records.len()
        );
    }

    Dataset::from_records(records)
}

/// Normalize a single payload entry
pub fn normalize_record(id: &str, fields: &Value) -> PoiRecord {
    let Value::Object(fields) = fields else {
        debug!("Record {} is not an object", id);
        return PoiRecord {
            id: id.to_string(),
            name: None,
            longitude: None,
            latitude: None,
            raw_label: None,
            distance_meters: None,
            error: Some(format!("record is {}, not an object", json_type_name(fields))),
            quality: RecordQuality::Error,
        };
    };

    let name = fields.get(NAME_FIELD).and_then(coerce_text);
    let distance_meters = fields.get(DISTANCE_FIELD).and_then(coerce_number);

    if let Some(error) = fields.get(ERROR_FIELD).and_then(error_marker) {
        debug!("Record {} tagged with error: {}", id, error);
        return PoiRecord {
            id: id.to_string(),
            name,
            longitude: None,
            latitude: None,
            raw_label: fields.get(LABEL_FIELD).cloned(),
            distance_meters,
            error: Some(error),
            quality: RecordQuality::Error,
        };
    }

    let longitude = fields.get(LNG_FIELD).and_then(coerce_coordinate);
    let latitude = fields.get(LAT_FIELD).and_then(coerce_coordinate);

    let usable = match (latitude, longitude) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng).validate().is_ok(),
        _ => false,
    };
    if !usable {
        debug!(
            "Record {} has unusable coordinates ({:?}, {:?})",
            id,
            fields.get(LNG_FIELD),
            fields.get(LAT_FIELD)
        );
    }

    PoiRecord {
        id: id.to_string(),
        name,
        longitude,
        latitude,
        raw_label: fields.get(LABEL_FIELD).cloned().filter(|v| !v.is_null()),
        distance_meters,
        error: None,
        quality: if usable {
            RecordQuality::Ok
        } else {
            RecordQuality::Malformed
        },
    }
}

/// Coerce a number or numeric string to a finite float
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Coerce a coordinate; exact zero is treated as a missing value
fn coerce_coordinate(value: &Value) -> Option<f64> {
    coerce_number(value).filter(|v| *v != 0.0)
}

fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Interpret an `error` field
///
/// `null`, `false` and blank strings mean "no error".
fn error_marker(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("flagged by analysis".to_string()),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::Category;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        payload_from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_and_text_coordinates() {
        let raw = payload(json!({
            "a": {"x_cord": -103.39, "y_cord": 20.72, "label": 1},
            "b": {"x_cord": "-103.40", "y_cord": " 20.73 ", "label": "2.1"}
        }));
        let dataset = normalize(&raw);

        let a = dataset.get("a").unwrap();
        assert_eq!(a.quality, RecordQuality::Ok);
        assert_eq!(a.longitude, Some(-103.39));
        assert_eq!(a.latitude, Some(20.72));

        let b = dataset.get("b").unwrap();
        assert_eq!(b.quality, RecordQuality::Ok);
        assert_eq!(b.longitude, Some(-103.40));
        assert_eq!(b.latitude, Some(20.73));
        assert_eq!(b.category(), Some(Category::WrongLocation));
    }

    #[test]
    fn test_malformed_coordinates_still_classified() {
        let raw = payload(json!({
            "a": {"x_cord": "12.5", "y_cord": "foo", "label": 1}
        }));
        let a = normalize(&raw).get("a").cloned().unwrap();

        assert!(a.is_malformed());
        assert!(a.coordinates().is_none());
        assert_eq!(a.category(), Some(Category::RuleException));
    }

    #[test]
    fn test_zero_missing_and_out_of_range_coordinates() {
        let raw = payload(json!({
            "zero": {"x_cord": 0, "y_cord": 20.7, "label": 0},
            "missing": {"y_cord": 20.7, "label": 0},
            "nan": {"x_cord": "NaN", "y_cord": 20.7, "label": 0},
            "range": {"x_cord": -103.4, "y_cord": 120.0, "label": 0},
            "bool": {"x_cord": true, "y_cord": 20.7, "label": 0}
        }));
        let dataset = normalize(&raw);

        for record in dataset.iter() {
            assert!(record.is_malformed(), "{} should be malformed", record.id);
            assert_eq!(record.category(), Some(Category::NonExistent));
        }
    }

    #[test]
    fn test_error_rows_are_kept_for_audit() {
        let raw = payload(json!({
            "p3": {"error": "bad row", "POI_NAME": "Gas Station", "x_cord": -103.4, "y_cord": 20.7}
        }));
        let p3 = normalize(&raw).get("p3").cloned().unwrap();

        assert!(p3.is_error());
        assert_eq!(p3.error.as_deref(), Some("bad row"));
        assert_eq!(p3.name.as_deref(), Some("Gas Station"));
        assert_eq!(p3.category(), None);
        assert!(p3.coordinates().is_none());
    }

    #[test]
    fn test_error_marker_variants() {
        let raw = payload(json!({
            "null": {"error": null, "x_cord": -103.4, "y_cord": 20.7, "label": 1},
            "false": {"error": false, "x_cord": -103.4, "y_cord": 20.7, "label": 1},
            "blank": {"error": "  ", "x_cord": -103.4, "y_cord": 20.7, "label": 1},
            "true": {"error": true},
            "code": {"error": 500}
        }));
        let dataset = normalize(&raw);

        assert!(!dataset.get("null").unwrap().is_error());
        assert!(!dataset.get("false").unwrap().is_error());
        assert!(!dataset.get("blank").unwrap().is_error());
        assert_eq!(
            dataset.get("true").unwrap().error.as_deref(),
            Some("flagged by analysis")
        );
        assert_eq!(dataset.get("code").unwrap().error.as_deref(), Some("500"));
    }

    #[test]
    fn test_non_object_entry_is_quarantined() {
        let raw = payload(json!({
            "ok": {"x_cord": -103.4, "y_cord": 20.7, "label": 1},
            "junk": [1, 2, 3]
        }));
        let dataset = normalize(&raw);

        assert_eq!(dataset.len(), 2);
        assert!(dataset.get("junk").unwrap().is_error());
        assert!(!dataset.get("ok").unwrap().is_error());
    }

    #[test]
    fn test_missing_label_is_unknown() {
        let raw = payload(json!({"a": {"x_cord": -103.4, "y_cord": 20.7}}));
        let a = normalize(&raw).get("a").cloned().unwrap();
        assert_eq!(a.raw_label, None);
        assert_eq!(a.category(), Some(Category::Unknown));
    }

    #[test]
    fn test_name_and_distance() {
        let raw = payload(json!({
            "a": {"POI_NAME": "  ", "x_cord": -103.4, "y_cord": 20.7, "label": 1, "distance": "12.5"},
            "b": {"POI_NAME": 7, "x_cord": -103.4, "y_cord": 20.7, "label": 1, "distance": "far"}
        }));
        let dataset = normalize(&raw);

        let a = dataset.get("a").unwrap();
        assert_eq!(a.name, None);
        assert_eq!(a.distance_meters, Some(12.5));

        let b = dataset.get("b").unwrap();
        assert_eq!(b.name.as_deref(), Some("7"));
        assert_eq!(b.distance_meters, None);
    }

    #[test]
    fn test_payload_order_is_preserved() {
        let raw = parse_payload(r#"{"z": {"label": 1}, "a": {"label": 0}, "m": {"label": 1}}"#)
            .unwrap();
        let ids: Vec<_> = normalize(&raw).iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_double_encoded_payload() {
        let inner = json!({"a": {"x_cord": -103.4, "y_cord": 20.7, "label": 1}}).to_string();
        let outer = serde_json::to_string(&inner).unwrap();

        let raw = parse_payload(&outer).unwrap();
        assert!(raw.contains_key("a"));
    }

    #[test]
    fn test_rejects_non_object_payload() {
        assert!(matches!(
            parse_payload("[1, 2]"),
            Err(Error::InvalidPayload(_))
        ));
        assert!(matches!(parse_payload("not json"), Err(Error::Json(_))));
        assert!(matches!(
            parse_payload(r#""[1]""#),
            Err(Error::InvalidPayload(_))
        ));
    }
}
