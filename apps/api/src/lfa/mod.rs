//! List-Filter-Aggregate core.
//!
//! Every list endpoint runs the same pipeline: filter → sort → paginate, with
//! summary stats computed alongside. Entity modules only declare their fields.

pub mod aggregate;
pub mod filter;
pub mod paginate;
pub mod selection;
pub mod view;

/// A record held in an in-memory entity store.
///
/// `id` must be unique within its store for the lifetime of the process.
pub trait Record {
    fn id(&self) -> &str;
}
