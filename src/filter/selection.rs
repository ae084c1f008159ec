//! The dashboard's filter state and the order in which it is applied.
//!
//! Evaluation always starts from the full dataset:
//!
//! 1. "All Data" applies nothing and offers no related filters.
//! 2. Otherwise the primary values are applied. `All` resolves to every
//!    distinct non-Unknown value of the dimension's column.
//! 3. Each related filter of the dimension then narrows the already-narrowed
//!    view, in table order, against the options still available in it.
//!
//! Any step whose resolved selection is empty is skipped, and related filters
//! only run once the primary filter has run.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::dimensions::{ALL_DATA, ValueDomain, column_for, relation_named, relations_for};
use crate::filter::{apply, apply_buckets, distinct_values};
use crate::model::{Dataset, RideView};

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("'{relation}' is not a related filter of '{dimension}'")]
    UnknownRelation { dimension: String, relation: String },

    #[error("'{bucket}' is not a bucket of '{relation}'")]
    UnknownBucket { relation: String, bucket: String },
}

/// A multi-select widget's value. Widgets start with every option selected.
///
/// Serialized as `null` for [`Selection::All`] and a list otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Option<Vec<String>>")]
pub enum Selection {
    #[default]
    All,
    Only(Vec<String>),
}

impl From<Option<Vec<String>>> for Selection {
    fn from(values: Option<Vec<String>>) -> Self {
        values.map_or(Selection::All, Selection::Only)
    }
}

impl From<Selection> for Option<Vec<String>> {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::All => None,
            Selection::Only(values) => Some(values),
        }
    }
}

impl Selection {
    /// Parses `all`, `none`, or a comma-separated list of values.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            t if t.eq_ignore_ascii_case("all") => Selection::All,
            t if t.eq_ignore_ascii_case("none") || t.is_empty() => Selection::Only(Vec::new()),
            t => Selection::Only(
                t.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    /// The concrete values selected out of `options`.
    ///
    /// Listed values take the spelling of the option they match ignoring
    /// ASCII case; values matching no option are kept as typed.
    pub fn resolve(&self, options: &[String]) -> Vec<String> {
        match self {
            Selection::All => options.to_vec(),
            Selection::Only(values) => values
                .iter()
                .map(|v| {
                    options
                        .iter()
                        .find(|o| o.eq_ignore_ascii_case(v))
                        .unwrap_or(v)
                        .clone()
                })
                .collect(),
        }
    }
}

fn default_dimension() -> String {
    ALL_DATA.to_string()
}

/// Everything the user has chosen in the filter sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default)]
    pub values: Selection,
    #[serde(default)]
    pub relations: BTreeMap<String, Selection>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            values: Selection::All,
            relations: BTreeMap::new(),
        }
    }
}

/// One filter step that actually narrowed the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFilter {
    pub name: String,
    pub selected: Vec<String>,
    pub rows_after: usize,
}

/// Options a related filter offered, taken from the view it was reached with.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferedOptions {
    pub name: &'static str,
    pub options: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    pub view: RideView<'a>,
    pub applied: Vec<AppliedFilter>,
    pub offered: Vec<OfferedOptions>,
}

impl FilterState {
    pub fn for_dimension(dimension: &str) -> Self {
        Self {
            dimension: dimension.to_string(),
            ..Default::default()
        }
    }

    /// Loads a filter preset from a JSON file, e.g.
    ///
    /// ```json
    /// {
    ///   "dimension": "Payment Method",
    ///   "values": ["UPI", "Cash"],
    ///   "relations": { "Distance Range": ["short"] }
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let state: FilterState = serde_json::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    pub fn is_all_data(&self) -> bool {
        self.dimension == ALL_DATA
    }

    /// Checks dimension, relation and bucket names against the static tables.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.is_all_data() && column_for(&self.dimension).is_none() {
            return Err(SelectionError::UnknownDimension(self.dimension.clone()));
        }

        for (name, selection) in &self.relations {
            let relation = relation_named(&self.dimension, name).ok_or_else(|| {
                SelectionError::UnknownRelation {
                    dimension: self.dimension.clone(),
                    relation: name.clone(),
                }
            })?;

            if let (ValueDomain::Buckets(rule), Selection::Only(values)) =
                (relation.domain, selection)
            {
                if let Some(bad) = values.iter().find(|v| rule.find(v).is_none()) {
                    return Err(SelectionError::UnknownBucket {
                        relation: name.clone(),
                        bucket: bad.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Applies the state to `dataset`, returning the filtered view and the
    /// steps that ran.
    pub fn evaluate<'a>(&self, dataset: &'a Dataset) -> Result<Evaluation<'a>, SelectionError> {
        self.validate()?;

        let mut view = dataset.view();
        let mut applied = Vec::new();
        let mut offered = Vec::new();

        let Some(column) = column_for(&self.dimension) else {
            return Ok(Evaluation { view, applied, offered });
        };

        let options = distinct_values(&view, column);
        let selected = self.values.resolve(&options);
        if selected.is_empty() {
            debug!(dimension = %self.dimension, "Empty primary selection, no filter applied");
            return Ok(Evaluation { view, applied, offered });
        }

        view = apply(&view, Some(column), &selected);
        debug!(dimension = %self.dimension, rows = view.len(), "Primary filter applied");
        applied.push(AppliedFilter {
            name: self.dimension.clone(),
            selected,
            rows_after: view.len(),
        });

        for relation in relations_for(&self.dimension) {
            let options = relation.options(&view);
            let selected = self
                .relations
                .get(relation.name)
                .map_or_else(|| options.clone(), |s| s.resolve(&options));
            let skip = options.is_empty() || selected.is_empty();
            offered.push(OfferedOptions {
                name: relation.name,
                options,
            });
            if skip {
                continue;
            }

            view = match relation.domain {
                ValueDomain::Categories(_) => apply(&view, Some(relation.column), &selected),
                ValueDomain::Buckets(rule) => {
                    let ranges = selected
                        .iter()
                        .map(|s| {
                            rule.find(s).ok_or_else(|| SelectionError::UnknownBucket {
                                relation: relation.name.to_string(),
                                bucket: s.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    apply_buckets(&view, relation.column, &ranges)
                }
            };

            debug!(relation = relation.name, rows = view.len(), "Related filter applied");
            applied.push(AppliedFilter {
                name: relation.name.to_string(),
                selected,
                rows_after: view.len(),
            });
        }

        Ok(Evaluation {
            view,
            applied,
            offered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::ride;

    fn sample() -> Dataset {
        let mut upi_long = ride("Auto", "Success", 1200.0);
        upi_long.payment_method = "UPI".to_string();
        upi_long.ride_distance = 40.0;

        let mut low_rating = ride("Bike", "Cancelled by Driver", 50.0);
        low_rating.customer_rating = 2.0;

        let mut mid_rating = ride("Bike", "Success", 300.0);
        mid_rating.customer_rating = 3.2;

        Dataset::new(vec![
            upi_long,
            low_rating,
            mid_rating,
            ride("Unknown", "Success", 80.0),
            ride("Mini", "Incomplete", 600.0),
        ])
    }

    #[test]
    fn test_all_data_returns_everything() {
        let ds = sample();
        let eval = FilterState::default().evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 5);
        assert!(eval.applied.is_empty());
        assert!(eval.offered.is_empty());
    }

    #[test]
    fn test_default_primary_selection_drops_unknown() {
        let ds = sample();
        let eval = FilterState::for_dimension("Vehicle Type").evaluate(&ds).unwrap();
        // the default customer rating buckets also drop the 2.0 rating
        assert_eq!(eval.view.len(), 3);
        assert!(eval.view.iter().all(|r| r.vehicle_type != "Unknown"));
    }

    #[test]
    fn test_only_primary_values() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Vehicle Type");
        state.values = Selection::Only(vec!["Auto".to_string()]);

        let eval = state.evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 1);
        assert_eq!(eval.view.rows()[0].booking_value, 1200.0);
    }

    #[test]
    fn test_empty_primary_selection_is_pass_through() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Vehicle Type");
        state.values = Selection::Only(Vec::new());
        state
            .relations
            .insert("Booking Status".to_string(), Selection::parse("Success"));

        let eval = state.evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 5);
        assert!(eval.applied.is_empty());
    }

    #[test]
    fn test_related_filters_intersect() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Vehicle Type");
        state
            .relations
            .insert("Booking Status".to_string(), Selection::parse("Success"));
        state
            .relations
            .insert("Customer Rating".to_string(), Selection::parse("low"));

        let eval = state.evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 1);
        assert_eq!(eval.view.rows()[0].customer_rating, 3.2);
    }

    #[test]
    fn test_categorical_values_ignore_case() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Vehicle Type");
        state.values = Selection::parse("auto, BIKE");
        state
            .relations
            .insert("Payment Method".to_string(), Selection::parse("upi"));

        let eval = state.evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 1);
        assert_eq!(eval.applied[0].selected, vec!["Auto", "Bike"]);
        assert_eq!(eval.applied[1].selected, vec!["UPI"]);
    }

    #[test]
    fn test_offered_options_follow_narrowed_view() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Vehicle Type");
        state
            .relations
            .insert("Payment Method".to_string(), Selection::parse("UPI"));

        let eval = state.evaluate(&ds).unwrap();
        let names: Vec<_> = eval.offered.iter().map(|o| o.name).collect();
        assert_eq!(
            names,
            ["Payment Method", "Booking Status", "Customer Rating", "Driver Rating"]
        );
        assert_eq!(eval.offered[0].options, vec!["Cash", "UPI"]);
        assert_eq!(eval.offered[1].options, vec!["Success"]);
        assert_eq!(eval.offered[2].options.len(), 3);
    }

    #[test]
    fn test_bucket_selection_on_payment_method() {
        let ds = sample();
        let mut state = FilterState::for_dimension("Payment Method");
        state
            .relations
            .insert("Value Range".to_string(), Selection::parse("High (₹1000+)"));

        let eval = state.evaluate(&ds).unwrap();
        assert_eq!(eval.view.len(), 1);
        assert_eq!(eval.view.rows()[0].payment_method, "UPI");
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let ds = sample();
        let state = FilterState::for_dimension("Fare");
        assert_eq!(
            state.evaluate(&ds).unwrap_err(),
            SelectionError::UnknownDimension("Fare".to_string())
        );

        let mut state = FilterState::for_dimension("Vehicle Type");
        state
            .relations
            .insert("Value Range".to_string(), Selection::All);
        assert!(matches!(
            state.validate(),
            Err(SelectionError::UnknownRelation { .. })
        ));

        let mut state = FilterState::for_dimension("Pickup Location");
        state
            .relations
            .insert("Distance Range".to_string(), Selection::parse("far"));
        assert!(matches!(
            state.validate(),
            Err(SelectionError::UnknownBucket { .. })
        ));
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse("ALL"), Selection::All);
        assert_eq!(Selection::parse("none"), Selection::Only(vec![]));
        assert_eq!(
            Selection::parse("Auto, Prime SUV ,"),
            Selection::Only(vec!["Auto".to_string(), "Prime SUV".to_string()])
        );
    }

    #[test]
    fn test_state_json_round_trip_uses_null_for_all() {
        let json = r#"{"dimension":"Payment Method","values":["UPI"],"relations":{"Distance Range":null}}"#;
        let state: FilterState = serde_json::from_str(json).unwrap();
        assert_eq!(state.values, Selection::Only(vec!["UPI".to_string()]));
        assert_eq!(state.relations["Distance Range"], Selection::All);

        let partial: FilterState = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, FilterState::default());
    }
}
