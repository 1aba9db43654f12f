//! Table query pipeline
//!
//! Filter, search, sort and paginate a dataset. Stages always run in that
//! order. The pipeline is a pure function of the dataset and `QueryParams`;
//! it keeps no state between calls.

pub mod sort;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::poi::{Category, Dataset, PoiRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use sort::{SortDirection, SortField, SortKey};

/// Which records a query keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    /// Records of exactly one category
    Category(Category),
    /// Classified records counted as valid
    Valid,
    /// Classified records needing correction
    Invalid,
    /// Error-tagged records
    Errors,
}

impl StatusFilter {
    /// Whether a record passes this filter
    pub fn matches(&self, record: &PoiRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => record.category() == Some(*category),
            Self::Valid => record.category().is_some_and(|c| c.is_valid()),
            Self::Invalid => record.category().is_some_and(|c| !c.is_valid()),
            Self::Errors => record.is_error(),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(category) => write!(f, "{}", category),
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Errors => write!(f, "errors"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "error" | "errors" => Ok(Self::Errors),
            other => Category::from_str(other)
                .map(Self::Category)
                .map_err(|_| format!("Unknown status filter: {}", s)),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.to_string()
    }
}

/// Query parameters
///
/// Use the setters to change filter, search or sort: each resets the active
/// page to 1 so a stale page index never carries over to a different
/// result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub status: StatusFilter,
    pub search: String,
    pub sort_by: SortField,
    pub direction: SortDirection,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            search: String::new(),
            sort_by: SortField::Id,
            direction: SortDirection::Asc,
            page: 1,
            page_size: crate::config::defaults::DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    /// Defaults taken from the `[defaults]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        let sort_by: SortField = config
            .defaults
            .sort_by
            .parse()
            .map_err(|e: String| Error::Config(e))?;
        let direction: SortDirection = config
            .defaults
            .direction
            .parse()
            .map_err(|e: String| Error::Config(e))?;

        Ok(Self {
            sort_by,
            direction,
            page_size: config.defaults.page_size.max(1),
            ..Self::default()
        })
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Sort by a column the way a table header click does
    ///
    /// The same column toggles direction; a new column starts ascending.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_by == field {
            self.direction = self.direction.toggled();
        } else {
            self.sort_by = field;
            self.direction = SortDirection::Asc;
        }
        self.page = 1;
    }

    pub fn set_direction(&mut self, direction: SortDirection) {
        self.direction = direction;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Whether a record passes the status filter and the text search
    pub fn matches(&self, record: &PoiRecord) -> bool {
        self.status.matches(record) && matches_search(record, &self.search.to_lowercase())
    }
}

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage<'a> {
    pub items: Vec<&'a PoiRecord>,
    /// Page actually returned, after clamping
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Records matching the filter and search, across all pages
    pub total_count: usize,
}

/// Case-insensitive substring match on id and name; `term` must be lowercase
fn matches_search(record: &PoiRecord, term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    record.id.to_lowercase().contains(term)
        || record
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(term))
}

/// Apply the status filter and text search, keeping dataset order
pub fn filter<'a>(dataset: &'a Dataset, params: &QueryParams) -> Vec<&'a PoiRecord> {
    let term = params.search.to_lowercase();
    dataset
        .iter()
        .filter(|r| params.status.matches(r) && matches_search(r, &term))
        .collect()
}

/// Stable sort on the requested field
///
/// Keys are extracted once per record. Equal keys keep their relative
/// order in both directions.
pub fn sort_records<'a>(
    records: Vec<&'a PoiRecord>,
    field: SortField,
    direction: SortDirection,
) -> Vec<&'a PoiRecord> {
    let mut keyed: Vec<(SortKey, &'a PoiRecord)> =
        records.into_iter().map(|r| (field.key(r), r)).collect();

    match direction {
        SortDirection::Asc => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Desc => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Run the full pipeline: filter → search → sort → paginate
///
/// A page past the end is clamped to the last page.
pub fn query<'a>(dataset: &'a Dataset, params: &QueryParams) -> QueryPage<'a> {
    let sorted = sort_records(filter(dataset, params), params.sort_by, params.direction);

    let page_size = params.page_size.max(1);
    let total_count = sorted.len();
    let total_pages = total_count.div_ceil(page_size);
    let page = params.page.clamp(1, total_pages.max(1));

    let start = (page - 1) * page_size;
    let items = sorted.into_iter().skip(start).take(page_size).collect();

    QueryPage {
        items,
        page,
        page_size,
        total_pages,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::ingest::{normalize, payload_from_value};
    use serde_json::json;

    fn dataset() -> Dataset {
        normalize(
            &payload_from_value(json!({
                "poi-3": {"POI_NAME": "Oxxo Centro", "x_cord": -103.39, "y_cord": 20.72, "label": "2.1", "distance": 12.0},
                "poi-1": {"POI_NAME": "Pemex", "x_cord": -103.40, "y_cord": 20.73, "label": "4.0", "distance": 3.5},
                "poi-2": {"POI_NAME": "oxxo norte", "x_cord": -103.41, "y_cord": 20.74, "label": 0, "distance": 12.0},
                "poi-10": {"x_cord": -103.42, "y_cord": 20.75, "label": 1},
                "poi-4": {"error": "bad row"}
            }))
            .unwrap(),
        )
    }

    fn ids(page: &QueryPage) -> Vec<String> {
        page.items.iter().map(|r| r.id.clone()).collect()
    }

    fn numbered(count: usize) -> Dataset {
        let mut map = serde_json::Map::new();
        for i in 0..count {
            map.insert(
                format!("{:03}", i),
                json!({"x_cord": -103.4, "y_cord": 20.7, "label": 1}),
            );
        }
        normalize(&map)
    }

    #[test]
    fn test_default_query_is_sorted_by_id() {
        let data = dataset();
        let page = query(&data, &QueryParams::default());

        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(ids(&page), vec!["poi-1", "poi-10", "poi-2", "poi-3", "poi-4"]);
    }

    #[test]
    fn test_status_filters() {
        let data = dataset();
        let mut params = QueryParams::default();

        params.set_status(StatusFilter::Category(Category::WrongLocation));
        assert_eq!(ids(&query(&data, &params)), vec!["poi-3"]);

        params.set_status(StatusFilter::Valid);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-1", "poi-10"]);

        params.set_status(StatusFilter::Invalid);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-2", "poi-3"]);

        params.set_status(StatusFilter::Errors);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-4"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_id_and_name() {
        let data = dataset();
        let mut params = QueryParams::default();

        params.set_search("OXXO");
        assert_eq!(ids(&query(&data, &params)), vec!["poi-2", "poi-3"]);

        params.set_search("poi-1");
        assert_eq!(ids(&query(&data, &params)), vec!["poi-1", "poi-10"]);

        params.set_search("   ");
        assert_eq!(query(&data, &params).total_count, 5);
    }

    #[test]
    fn test_sort_by_number_and_name() {
        let data = dataset();
        let mut params = QueryParams::default();
        params.set_status(StatusFilter::Invalid);

        params.sort_by(SortField::Latitude);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-3", "poi-2"]);

        params.sort_by(SortField::Latitude);
        assert_eq!(params.direction, SortDirection::Desc);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-2", "poi-3"]);

        // Case-sensitive: uppercase sorts first
        params.set_status(StatusFilter::All);
        params.sort_by(SortField::Name);
        assert_eq!(params.direction, SortDirection::Asc);
        assert_eq!(
            ids(&query(&data, &params)),
            vec!["poi-3", "poi-1", "poi-10", "poi-4", "poi-2"]
        );
    }

    #[test]
    fn test_stable_sort_in_both_directions() {
        let data = dataset();
        let mut params = QueryParams::default();
        params.set_status(StatusFilter::Invalid);
        params.sort_by(SortField::Distance);

        // poi-3 and poi-2 share distance 12.0; dataset order is poi-3, poi-2
        assert_eq!(ids(&query(&data, &params)), vec!["poi-3", "poi-2"]);
        params.set_direction(SortDirection::Desc);
        assert_eq!(ids(&query(&data, &params)), vec!["poi-3", "poi-2"]);

        // Missing distances sort before numbers, so they trail when descending
        params.set_status(StatusFilter::All);
        assert_eq!(
            ids(&query(&data, &params)),
            vec!["poi-3", "poi-2", "poi-1", "poi-10", "poi-4"]
        );
    }

    #[test]
    fn test_missing_distance_sorts_first_ascending() {
        let data = normalize(
            &payload_from_value(json!({
                "a": {"x_cord": -103.4, "y_cord": 20.7, "label": 1, "distance": 5.0},
                "b": {"x_cord": -103.4, "y_cord": 20.7, "label": 1}
            }))
            .unwrap(),
        );
        let mut params = QueryParams::default();
        params.sort_by(SortField::Distance);

        assert_eq!(ids(&query(&data, &params)), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_order_does_not_change_results() {
        let data = dataset();
        let mut params = QueryParams::default();
        params.set_status(StatusFilter::Invalid);
        params.sort_by(SortField::Distance);
        params.set_direction(SortDirection::Desc);

        let pipeline = ids(&query(&data, &params));

        let all: Vec<&PoiRecord> = data.iter().collect();
        let sorted_first: Vec<String> = sort_records(all, params.sort_by, params.direction)
            .into_iter()
            .filter(|r| params.matches(r))
            .map(|r| r.id.clone())
            .collect();

        assert_eq!(pipeline, sorted_first);
    }

    #[test]
    fn test_pagination_and_clamp() {
        let data = numbered(25);
        let mut params = QueryParams::default();

        params.set_page(2);
        let page = query(&data, &params);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].id, "010");

        params.set_page(99);
        let page = query(&data, &params);
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, "020");
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let data = dataset();
        let mut params = QueryParams::default();
        params.set_search("nothing matches this");
        params.set_page(4);

        let page = query(&data, &params);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parameter_changes_reset_page() {
        let mut params = QueryParams::default();

        params.set_page(3);
        params.set_search("oxxo");
        assert_eq!(params.page, 1);

        params.set_page(3);
        params.set_status(StatusFilter::Valid);
        assert_eq!(params.page, 1);

        params.set_page(3);
        params.sort_by(SortField::Distance);
        assert_eq!(params.page, 1);

        params.set_page(3);
        params.set_page_size(0);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 1);
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("errors".parse::<StatusFilter>(), Ok(StatusFilter::Errors));
        assert_eq!(
            "rule-exception".parse::<StatusFilter>(),
            Ok(StatusFilter::Category(Category::RuleException))
        );
        assert!("sideways".parse::<StatusFilter>().is_err());

        let json = serde_json::to_string(&StatusFilter::Category(Category::Unknown)).unwrap();
        assert_eq!(json, "\"unknown\"");
    }

    #[test]
    fn test_params_from_config() {
        let mut config = Config::default();
        config.defaults.sort_by = "distance".to_string();
        config.defaults.direction = "desc".to_string();
        config.defaults.page_size = 25;

        let params = QueryParams::from_config(&config).unwrap();
        assert_eq!(params.sort_by, SortField::Distance);
        assert_eq!(params.direction, SortDirection::Desc);
        assert_eq!(params.page_size, 25);

        config.defaults.sort_by = "height".to_string();
        assert!(QueryParams::from_config(&config).is_err());
    }
}
