//! Derived View: the filtered, sorted, paginated projection of a store plus
//! its summary stats.
//!
//! Stats are always computed over the full store; filters only change
//! `items` and `total_matching`.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::lfa::filter::{apply_filter, FilterConfig, Filterable};
use crate::lfa::paginate::{sort_records, PageLimits, PageRequest, SortSpec, Sortable};
use crate::lfa::Record;

#[derive(Debug, Clone, Serialize)]
pub struct DerivedView<T, S> {
    pub items: Vec<T>,
    pub total_matching: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub stats: S,
}

/// Everything a list request can ask of the pipeline.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    pub filter: FilterConfig,
    pub sort: Option<SortSpec>,
    pub page: PageRequest,
}

impl ViewQuery {
    pub fn unfiltered(limits: PageLimits) -> Self {
        Self {
            filter: FilterConfig::default(),
            sort: None,
            page: PageRequest::first(limits),
        }
    }

    pub fn from_params<T: Filterable + Sortable>(
        params: &HashMap<String, String>,
        limits: PageLimits,
    ) -> Result<Self, AppError> {
        Ok(Self {
            filter: FilterConfig::from_params::<T>(params)?,
            sort: SortSpec::from_params::<T>(params)?,
            page: PageRequest::from_params(params, limits)?,
        })
    }
}

pub fn derive_view<T, S>(
    store: &[T],
    query: &ViewQuery,
    summarize: impl FnOnce(&[T]) -> S,
) -> DerivedView<T, S>
where
    T: Filterable + Sortable + Clone,
{
    let mut matching = apply_filter(store, &query.filter);
    if let Some(sort) = &query.sort {
        sort_records(&mut matching, sort);
    }

    let total_matching = matching.len();
    let items = query
        .page
        .slice(&matching)
        .iter()
        .map(|r| (*r).clone())
        .collect();

    DerivedView {
        items,
        total_matching,
        page: query.page.page,
        page_size: query.page.page_size,
        total_pages: query.page.total_pages(total_matching),
        stats: summarize(store),
    }
}

/// Ids of every record the filter admits, ignoring pagination.
pub fn visible_ids<T: Record + Filterable>(store: &[T], filter: &FilterConfig) -> Vec<String> {
    apply_filter(store, filter)
        .into_iter()
        .map(|r| r.id().to_string())
        .collect()
}
