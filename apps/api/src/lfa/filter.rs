//! Filter Predicate Set: a conjunction of free-text search, categorical
//! equality and numeric threshold predicates over a single record.
//!
//! Every predicate is pure. `matches` is re-evaluated for every record on
//! every request; nothing is memoized.

use std::collections::{BTreeMap, HashMap};

use crate::errors::AppError;

/// Sentinel accepted by categorical and threshold filters to mean "no filter".
pub const ALL: &str = "all";

/// Query keys consumed by pagination and sorting rather than filtering.
pub const RESERVED_PARAMS: &[&str] = &["page", "page_size", "sort", "order"];

const SEARCH_PARAMS: &[&str] = &["q", "search"];
const THRESHOLD_PREFIX: &str = "min_";

/// Field access needed by the predicate set.
///
/// `categorical` and `numeric` return `None` when the field is absent on this
/// record; an absent field never satisfies a concrete filter value.
pub trait Filterable {
    const CATEGORICAL_FIELDS: &'static [&'static str];
    const NUMERIC_FIELDS: &'static [&'static str];

    /// String fields scanned by free-text search.
    fn search_fields(&self) -> Vec<&str>;
    fn categorical(&self, field: &str) -> Option<&str>;
    fn numeric(&self, field: &str) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    All,
    Is(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
            CategoryFilter::All
        } else {
            CategoryFilter::Is(raw.to_string())
        }
    }

    fn admits(&self, value: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Is(wanted) => value == Some(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdFilter {
    All,
    AtLeast(f64),
}

impl ThresholdFilter {
    pub fn parse(field: &str, raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
            return Ok(ThresholdFilter::All);
        }
        match raw.parse::<f64>() {
            Ok(min) if min.is_finite() => Ok(ThresholdFilter::AtLeast(min)),
            _ => Err(AppError::Validation(format!(
                "threshold for '{field}' must be a number or '{ALL}', got '{raw}'"
            ))),
        }
    }

    fn admits(&self, value: Option<f64>) -> bool {
        match self {
            ThresholdFilter::All => true,
            ThresholdFilter::AtLeast(min) => value.is_some_and(|v| v >= *min),
        }
    }
}

/// The active filter configuration for one list view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    pub search_text: String,
    pub categorical: BTreeMap<String, CategoryFilter>,
    pub thresholds: BTreeMap<String, ThresholdFilter>,
}

impl FilterConfig {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn category(mut self, field: impl Into<String>, value: &str) -> Self {
        self.categorical
            .insert(field.into(), CategoryFilter::parse(value));
        self
    }

    pub fn at_least(mut self, field: impl Into<String>, min: f64) -> Self {
        self.thresholds
            .insert(field.into(), ThresholdFilter::AtLeast(min));
        self
    }

    /// True when no predicate can exclude a record.
    pub fn is_identity(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.categorical.values().all(|c| *c == CategoryFilter::All)
            && self.thresholds.values().all(|t| *t == ThresholdFilter::All)
    }

    /// Builds a config from list query parameters.
    ///
    /// - `q` / `search` → search text
    /// - `<field>=<value>` for declared categorical fields
    /// - `min_<field>=<number>` for declared numeric fields
    ///
    /// Pagination and sort keys are skipped; anything else is rejected.
    pub fn from_params<T: Filterable>(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut config = FilterConfig::default();

        for (key, value) in params {
            let key = key.as_str();
            if RESERVED_PARAMS.contains(&key) {
                continue;
            }
            if SEARCH_PARAMS.contains(&key) {
                config.search_text = value.clone();
                continue;
            }
            if T::CATEGORICAL_FIELDS.contains(&key) {
                config
                    .categorical
                    .insert(key.to_string(), CategoryFilter::parse(value));
                continue;
            }
            if let Some(field) = key.strip_prefix(THRESHOLD_PREFIX) {
                if T::NUMERIC_FIELDS.contains(&field) {
                    config
                        .thresholds
                        .insert(field.to_string(), ThresholdFilter::parse(field, value)?);
                    continue;
                }
            }
            return Err(AppError::Validation(format!(
                "unknown filter '{key}' (categorical: [{}], thresholds: [{}])",
                T::CATEGORICAL_FIELDS.join(", "),
                T::NUMERIC_FIELDS
                    .iter()
                    .map(|f| format!("{THRESHOLD_PREFIX}{f}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(config)
    }
}

/// Inclusion test for one record: AND across every active predicate.
pub fn matches<T: Filterable>(record: &T, config: &FilterConfig) -> bool {
    matches_search(record, &config.search_text)
        && config
            .categorical
            .iter()
            .all(|(field, filter)| filter.admits(record.categorical(field)))
        && config
            .thresholds
            .iter()
            .all(|(field, filter)| filter.admits(record.numeric(field)))
}

fn matches_search<T: Filterable>(record: &T, search_text: &str) -> bool {
    let needle = search_text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Returns the records that pass `config`, in store order.
pub fn apply_filter<'a, T: Filterable>(records: &'a [T], config: &FilterConfig) -> Vec<&'a T> {
    records.iter().filter(|r| matches(*r, config)).collect()
}
