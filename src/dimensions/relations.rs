//! Secondary ("related") filters offered once a primary dimension is chosen.

use crate::dimensions::bucket::BucketRule;
use crate::model::{Column, RideView};

const PAYMENT_METHODS: &[&str] = &["Cash", "Wallet", "Card", "UPI"];

const BOOKING_STATUSES: &[&str] = &[
    "Success",
    "Cancelled by Driver",
    "Cancelled by Customer",
    "Incomplete",
];

const VEHICLE_TYPES: &[&str] = &[
    "Auto",
    "Bike",
    "Mini",
    "Prime Plus",
    "Prime SUV",
    "Prime Sedan",
    "eBike",
];

/// Which values a relation can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueDomain {
    /// Exact-match against an ordered set of categories.
    Categories(&'static [&'static str]),
    /// Range buckets over a numeric column.
    Buckets(BucketRule),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relation {
    pub name: &'static str,
    pub column: Column,
    pub domain: ValueDomain,
}

impl Relation {
    const fn categories(name: &'static str, column: Column, values: &'static [&'static str]) -> Self {
        Self {
            name,
            column,
            domain: ValueDomain::Categories(values),
        }
    }

    const fn buckets(name: &'static str, column: Column, rule: BucketRule) -> Self {
        Self {
            name,
            column,
            domain: ValueDomain::Buckets(rule),
        }
    }

    /// Options to offer against the current view.
    ///
    /// Categorical relations list only the configured values present in the
    /// view, in configured order. Bucket relations always list every label.
    pub fn options(&self, view: &RideView<'_>) -> Vec<String> {
        match self.domain {
            ValueDomain::Categories(values) => values
                .iter()
                .filter(|v| view.iter().any(|r| r.text(self.column) == **v))
                .map(|v| v.to_string())
                .collect(),
            ValueDomain::Buckets(rule) => rule.labels().map(str::to_string).collect(),
        }
    }
}

static VEHICLE_TYPE_RELATIONS: [Relation; 4] = [
    Relation::categories("Payment Method", Column::PaymentMethod, PAYMENT_METHODS),
    Relation::categories("Booking Status", Column::BookingStatus, BOOKING_STATUSES),
    Relation::buckets("Customer Rating", Column::CustomerRating, BucketRule::Rating),
    Relation::buckets("Driver Rating", Column::DriverRatings, BucketRule::Rating),
];

static LOCATION_RELATIONS: [Relation; 4] = [
    Relation::categories("Vehicle Type", Column::VehicleType, VEHICLE_TYPES),
    Relation::categories("Payment Method", Column::PaymentMethod, PAYMENT_METHODS),
    Relation::categories("Booking Status", Column::BookingStatus, BOOKING_STATUSES),
    Relation::buckets("Distance Range", Column::RideDistance, BucketRule::Distance),
];

static CUSTOMER_RELATIONS: [Relation; 4] = [
    Relation::categories("Vehicle Preference", Column::VehicleType, VEHICLE_TYPES),
    Relation::categories("Payment Method", Column::PaymentMethod, PAYMENT_METHODS),
    Relation::categories("Booking Status", Column::BookingStatus, BOOKING_STATUSES),
    Relation::buckets("Rating Given", Column::CustomerRating, BucketRule::Rating),
];

static PAYMENT_RELATIONS: [Relation; 4] = [
    Relation::categories("Vehicle Usage", Column::VehicleType, VEHICLE_TYPES),
    Relation::categories("Booking Status", Column::BookingStatus, BOOKING_STATUSES),
    Relation::buckets("Distance Range", Column::RideDistance, BucketRule::Distance),
    Relation::buckets("Value Range", Column::BookingValue, BucketRule::Value),
];

/// Secondary relations for a primary dimension, in display order.
/// Empty for "All Data" and for dimensions with nothing configured.
pub fn relations_for(dimension: &str) -> &'static [Relation] {
    match dimension {
        "Vehicle Type" => &VEHICLE_TYPE_RELATIONS,
        "Pickup Location" | "Drop Location" => &LOCATION_RELATIONS,
        "Customer ID" => &CUSTOMER_RELATIONS,
        "Payment Method" => &PAYMENT_RELATIONS,
        _ => &[],
    }
}

pub fn relation_named(dimension: &str, name: &str) -> Option<&'static Relation> {
    relations_for(dimension).iter().find(|r| r.name == name)
}
