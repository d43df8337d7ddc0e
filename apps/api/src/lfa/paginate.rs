//! Sorting and page slicing for derived views.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: usize,
    pub max_size: usize,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn first(limits: PageLimits) -> Self {
        Self {
            page: 1,
            page_size: limits.default_size,
        }
    }

    /// Reads `page` and `page_size`; oversized pages are clamped to the limit.
    pub fn from_params(
        params: &HashMap<String, String>,
        limits: PageLimits,
    ) -> Result<Self, AppError> {
        let page = parse_positive(params, "page")?.unwrap_or(1);
        let page_size = parse_positive(params, "page_size")?
            .unwrap_or(limits.default_size)
            .min(limits.max_size);
        Ok(Self { page, page_size })
    }

    /// Slice of `items` for this page. Empty when the page is past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.page_size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

fn parse_positive(params: &HashMap<String, String>, key: &str) -> Result<Option<usize>, AppError> {
    let Some(raw) = params.get(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(AppError::Validation(format!(
            "'{key}' must be a positive integer, got '{raw}'"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

pub trait Sortable {
    const SORT_FIELDS: &'static [&'static str];

    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

impl SortSpec {
    /// Reads `sort` and `order` (`asc` default). Returns `None` without `sort`.
    pub fn from_params<T: Sortable>(
        params: &HashMap<String, String>,
    ) -> Result<Option<Self>, AppError> {
        let Some(field) = params.get("sort").map(|s| s.trim()) else {
            return Ok(None);
        };
        if !T::SORT_FIELDS.contains(&field) {
            return Err(AppError::Validation(format!(
                "cannot sort by '{field}' (sortable: [{}])",
                T::SORT_FIELDS.join(", ")
            )));
        }
        let order = match params.get("order").map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "order must be 'asc' or 'desc', got '{other}'"
                )))
            }
        };
        Ok(Some(SortSpec {
            field: field.to_string(),
            order,
        }))
    }
}

fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortValue::Text(x), SortValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
    }
}

/// Stable sort; records without a value for the field go last in either order.
pub fn sort_records<T: Sortable>(records: &mut [&T], spec: &SortSpec) {
    records.sort_by(|a, b| {
        match (a.sort_value(&spec.field), b.sort_value(&spec.field)) {
            (Some(x), Some(y)) => match spec.order {
                SortOrder::Asc => compare_values(&x, &y),
                SortOrder::Desc => compare_values(&x, &y).reverse(),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
