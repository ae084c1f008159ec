//! Row filtering over [`RideView`]s.
//!
//! Every function here returns a new view and leaves its input untouched, so
//! the cached base dataset can be re-filtered from scratch on each change.

pub mod selection;

pub use selection::{
    AppliedFilter, Evaluation, FilterState, OfferedOptions, Selection, SelectionError,
};

use std::collections::BTreeSet;

use crate::dimensions::BucketRange;
use crate::model::{Column, RideView, UNKNOWN};

/// Keeps rows whose value in `column` is one of `allowed`.
///
/// A missing column or an empty `allowed` list means "no restriction" and the
/// view comes back unchanged.
pub fn apply<'a, S: AsRef<str>>(
    view: &RideView<'a>,
    column: Option<Column>,
    allowed: &[S],
) -> RideView<'a> {
    let Some(column) = column else {
        return view.clone();
    };
    if allowed.is_empty() {
        return view.clone();
    }

    let allowed: BTreeSet<&str> = allowed.iter().map(|s| s.as_ref()).collect();
    view.retain_where(|r| allowed.contains(&*r.text(column)))
}

/// Keeps rows whose numeric `column` falls in any of `ranges`.
///
/// The range masks are OR-ed together, then intersected with the view. An
/// empty `ranges` is a pass-through.
pub fn apply_buckets<'a>(
    view: &RideView<'a>,
    column: Column,
    ranges: &[&BucketRange],
) -> RideView<'a> {
    if ranges.is_empty() {
        return view.clone();
    }

    view.retain_where(|r| {
        r.numeric(column)
            .is_some_and(|v| ranges.iter().any(|range| range.contains(v)))
    })
}

/// Sorted distinct values of `column`, without [`UNKNOWN`].
pub fn distinct_values(view: &RideView<'_>, column: Column) -> Vec<String> {
    view.iter()
        .map(|r| r.text(column))
        .filter(|v| &**v != UNKNOWN)
        .map(|v| v.into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
