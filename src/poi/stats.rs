//! Per-category aggregation

use crate::poi::{Category, Dataset, PoiRecord};
use serde::{Deserialize, Serialize};

/// Aggregate counts over a dataset
///
/// `total` counts classified (non-error) records only; error-tagged rows are
/// reported separately so `sum(categories) + error_count` always equals the
/// raw record count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: usize,
    pub non_existent: usize,
    pub wrong_location: usize,
    pub invalid_location: usize,
    pub rule_exception: usize,
    pub unknown: usize,
    pub error_count: usize,
    /// Classified records whose coordinates were unusable
    pub malformed_count: usize,
    /// Valid records over classified records; 0 when nothing was classified
    pub validity_rate: f64,
}

impl CategoryStats {
    /// Count for one category
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::NonExistent => self.non_existent,
            Category::WrongLocation => self.wrong_location,
            Category::InvalidLocation => self.invalid_location,
            Category::RuleException => self.rule_exception,
            Category::Unknown => self.unknown,
        }
    }

    fn count_mut(&mut self, category: Category) -> &mut usize {
        match category {
            Category::NonExistent => &mut self.non_existent,
            Category::WrongLocation => &mut self.wrong_location,
            Category::InvalidLocation => &mut self.invalid_location,
            Category::RuleException => &mut self.rule_exception,
            Category::Unknown => &mut self.unknown,
        }
    }

    /// Number of records counted as valid
    pub fn valid_count(&self) -> usize {
        self.rule_exception
    }

    /// Classified records needing correction (every category but the valid one)
    pub fn invalid_count(&self) -> usize {
        self.total - self.valid_count()
    }

    /// Raw record count, error rows included
    pub fn record_count(&self) -> usize {
        self.total + self.error_count
    }
}

/// Aggregate a dataset
pub fn aggregate(dataset: &Dataset) -> CategoryStats {
    aggregate_records(dataset.iter())
}

/// Aggregate any sequence of records in a single pass
pub fn aggregate_records<'a>(records: impl IntoIterator<Item = &'a PoiRecord>) -> CategoryStats {
    let mut stats = CategoryStats::default();

    for record in records {
        match record.category() {
            Some(category) => {
                stats.total += 1;
                *stats.count_mut(category) += 1;
                if record.is_malformed() {
                    stats.malformed_count += 1;
                }
            }
            None => stats.error_count += 1,
        }
    }

    stats.validity_rate = if stats.total == 0 {
        0.0
    } else {
        stats.valid_count() as f64 / stats.total as f64
    };

    stats
}
