//! Outcome label parsing and classification
//!
//! The analysis backend emits two label encodings in the same field: the
//! legacy binary form (`0`/`1`) and a dotted four-way code (`"1.x"`..`"4.x"`).
//! Both are parsed once into a `LabelCode` so nothing downstream needs to
//! know which encoding a payload used.

use crate::poi::Category;
use serde_json::Value;

/// A raw label parsed at the ingestion boundary
#[derive(Debug, Clone, PartialEq)]
pub enum LabelCode {
    /// Dotted code; `prefix` is the leading digit (1..=4), `code` the full text
    Dotted { prefix: u8, code: String },
    /// Legacy binary label
    Binary(u8),
    /// Anything else, kept as text for audit
    Unknown(String),
}

impl LabelCode {
    /// Parse a label from its JSON value
    ///
    /// String prefixes are checked before numeric equality because dotted
    /// codes such as `"1.0"` would otherwise parse as the number 1.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Unknown(String::new()),
            Some(Value::String(s)) => Self::from_text(s),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Self::from_number(f).unwrap_or_else(|| Self::Unknown(n.to_string())),
                None => Self::Unknown(n.to_string()),
            },
            Some(other) => Self::Unknown(other.to_string()),
        }
    }

    /// Parse a label from text
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();

        for prefix in 1..=4u8 {
            if trimmed.starts_with(&format!("{}.", prefix)) {
                return Self::Dotted {
                    prefix,
                    code: trimmed.to_string(),
                };
            }
        }

        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_number)
            .unwrap_or_else(|| Self::Unknown(text.to_string()))
    }

    fn from_number(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Self::Binary(0))
        } else if value == 1.0 {
            Some(Self::Binary(1))
        } else {
            None
        }
    }

    /// Map the label to its outcome category
    pub fn classify(&self) -> Category {
        match self {
            Self::Dotted { prefix: 1, .. } => Category::NonExistent,
            Self::Dotted { prefix: 2, .. } => Category::WrongLocation,
            Self::Dotted { prefix: 3, .. } => Category::InvalidLocation,
            Self::Dotted { prefix: 4, .. } => Category::RuleException,
            Self::Binary(0) => Category::NonExistent,
            Self::Binary(1) => Category::RuleException,
            _ => Category::Unknown,
        }
    }
}

/// Classify a raw label value
///
/// Total: every input maps to exactly one category.
pub fn classify(raw_label: Option<&Value>) -> Category {
    LabelCode::from_value(raw_label).classify()
}
