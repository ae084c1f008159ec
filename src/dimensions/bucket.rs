//! Fixed numeric bucket rules for rating, distance and booking value.
//!
//! Each bucket is independently selectable. The rating buckets overlap:
//! Medium is `[3, 4)` and Low is `[3, 3.5)`, so a 3.2 rating matches both.
//! This mirrors the dashboard the rules come from and is kept as-is.

use std::ops::{Bound, RangeBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketRule {
    Rating,
    Distance,
    Value,
}

/// A labelled interval over a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketRange {
    pub key: &'static str,
    pub label: &'static str,
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
}

impl BucketRange {
    pub fn contains(&self, value: f64) -> bool {
        (self.lower, self.upper).contains(&value)
    }
}

static RATING_RANGES: [BucketRange; 3] = [
    BucketRange {
        key: "high",
        label: "High (4-5)",
        lower: Bound::Included(4.0),
        upper: Bound::Unbounded,
    },
    BucketRange {
        key: "medium",
        label: "Medium (3-4)",
        lower: Bound::Included(3.0),
        upper: Bound::Excluded(4.0),
    },
    BucketRange {
        key: "low",
        label: "Low (3-3.5)",
        lower: Bound::Included(3.0),
        upper: Bound::Excluded(3.5),
    },
];

static DISTANCE_RANGES: [BucketRange; 3] = [
    BucketRange {
        key: "short",
        label: "Short (1-15km)",
        lower: Bound::Unbounded,
        upper: Bound::Included(15.0),
    },
    BucketRange {
        key: "medium",
        label: "Medium (15-30km)",
        lower: Bound::Excluded(15.0),
        upper: Bound::Included(30.0),
    },
    BucketRange {
        key: "long",
        label: "Long (30km+)",
        lower: Bound::Excluded(30.0),
        upper: Bound::Unbounded,
    },
];

static VALUE_RANGES: [BucketRange; 3] = [
    BucketRange {
        key: "low",
        label: "Low (₹50-500)",
        lower: Bound::Unbounded,
        upper: Bound::Included(500.0),
    },
    BucketRange {
        key: "medium",
        label: "Medium (₹500-1000)",
        lower: Bound::Excluded(500.0),
        upper: Bound::Included(1000.0),
    },
    BucketRange {
        key: "high",
        label: "High (₹1000+)",
        lower: Bound::Excluded(1000.0),
        upper: Bound::Unbounded,
    },
];

impl BucketRule {
    pub fn ranges(self) -> &'static [BucketRange] {
        match self {
            BucketRule::Rating => &RATING_RANGES,
            BucketRule::Distance => &DISTANCE_RANGES,
            BucketRule::Value => &VALUE_RANGES,
        }
    }

    pub fn labels(self) -> impl Iterator<Item = &'static str> {
        self.ranges().iter().map(|r| r.label)
    }

    /// Looks a bucket up by its label or short key, ignoring case.
    pub fn find(self, name: &str) -> Option<&'static BucketRange> {
        let name = name.trim();
        self.ranges()
            .iter()
            .find(|r| r.label.eq_ignore_ascii_case(name) || r.key.eq_ignore_ascii_case(name))
    }

    /// Labels of the buckets `value` falls in. Rating values in `[3, 3.5)` get two.
    pub fn classify(self, value: f64) -> Vec<&'static str> {
        self.ranges()
            .iter()
            .filter(|r| r.contains(value))
            .map(|r| r.label)
            .collect()
    }
}
