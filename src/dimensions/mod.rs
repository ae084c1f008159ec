//! Static dimension configuration.
//!
//! [`registry`] maps primary dimension names to columns, [`relations`] maps a
//! primary dimension to its secondary filters, and [`bucket`] holds the fixed
//! numeric range rules some of those secondary filters use.

pub mod bucket;
pub mod registry;
pub mod relations;

pub use bucket::{BucketRange, BucketRule};
pub use registry::{ALL_DATA, column_for, dimension_names, selector_options};
pub use relations::{Relation, ValueDomain, relation_named, relations_for};
