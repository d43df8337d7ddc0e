pub mod candidate;
pub mod chat;
pub mod client;
pub mod contract;
pub mod employee;
pub mod invoice;
pub mod status;
pub mod vendor;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::lfa::aggregate::count_by;
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::Sortable;
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::repo::{Repositories, Repository};

/// A back-office entity with its own list page, stats cards and status
/// machine. Implementing this is all it takes to get the generic record routes.
pub trait Entity:
    Record
    + Filterable
    + Sortable
    + Clone
    + PartialEq
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const KIND: &'static str;
    /// URL segment under `/api/v1`.
    const COLLECTION: &'static str;
    /// Whether `POST /api/v1/<collection>` stores a posted record as is.
    /// Entities that reference other stores turn this off and offer their
    /// own creation route.
    const GENERIC_CREATE: bool = true;

    type Status: StatusMachine;
    type Stats: Serialize + Send + 'static;

    fn status(&self) -> Self::Status;
    /// Returns a copy with the new status; the original is left untouched.
    fn with_status(&self, status: Self::Status) -> Self;
    fn with_id(self, id: String) -> Self;
    /// Human-readable problems with required fields. Empty when valid.
    fn validate(&self) -> Vec<String>;
    fn summarize(store: &[Self]) -> Self::Stats;
    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>>;
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Per-status counts over a store, including statuses with no records.
pub fn status_breakdown<T: Entity>(store: &[T]) -> BTreeMap<&'static str, usize> {
    count_by(store, &<T::Status as StatusMachine>::labels(), |r| r.status().as_str())
}

pub(crate) fn require_text(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

pub(crate) fn require_email(errors: &mut Vec<String>, value: &str) {
    if value.trim().is_empty() {
        errors.push("email is required".to_string());
    } else if !value.contains('@') {
        errors.push(format!("email '{value}' is not a valid address"));
    }
}

pub(crate) fn require_range(
    errors: &mut Vec<String>,
    field: &str,
    value: Option<f64>,
    min: f64,
    max: f64,
) {
    if let Some(v) = value {
        if !(min..=max).contains(&v) {
            errors.push(format!("{field} must be between {min} and {max}, got {v}"));
        }
    }
}
