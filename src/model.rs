//! Ride records, column identifiers and row views.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Sentinel category for empty or null-like values.
pub const UNKNOWN: &str = "Unknown";

/// Status value counted as a successful booking.
pub const SUCCESS_STATUS: &str = "Success";

/// Column identifiers of the ride table, named after their CSV headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Date,
    Time,
    Hour,
    VehicleType,
    PickupLocation,
    DropLocation,
    CustomerId,
    PaymentMethod,
    BookingStatus,
    BookingValue,
    RideDistance,
    DriverRatings,
    CustomerRating,
    BookingCount,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Hour => "Hour",
            Column::VehicleType => "Vehicle Type",
            Column::PickupLocation => "Pickup Location",
            Column::DropLocation => "Drop Location",
            Column::CustomerId => "Customer ID",
            Column::PaymentMethod => "Payment Method",
            Column::BookingStatus => "Booking Status",
            Column::BookingValue => "Booking Value",
            Column::RideDistance => "Ride Distance",
            Column::DriverRatings => "Driver Ratings",
            Column::CustomerRating => "Customer Rating",
            Column::BookingCount => "Booking Count",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One booking after loading: categoricals normalized, numerics imputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Vehicle Type")]
    pub vehicle_type: String,
    #[serde(rename = "Pickup Location")]
    pub pickup_location: String,
    #[serde(rename = "Drop Location")]
    pub drop_location: String,
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Payment Method")]
    pub payment_method: String,
    #[serde(rename = "Booking Status")]
    pub booking_status: String,
    #[serde(rename = "Booking Value")]
    pub booking_value: f64,
    #[serde(rename = "Ride Distance")]
    pub ride_distance: f64,
    #[serde(rename = "Driver Ratings")]
    pub driver_rating: f64,
    #[serde(rename = "Customer Rating")]
    pub customer_rating: f64,
    #[serde(rename = "Booking Count")]
    pub booking_count: u32,
}

impl RideRecord {
    /// Numeric value of a measure column, `None` for non-numeric columns.
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::BookingValue => Some(self.booking_value),
            Column::RideDistance => Some(self.ride_distance),
            Column::DriverRatings => Some(self.driver_rating),
            Column::CustomerRating => Some(self.customer_rating),
            Column::Hour => Some(f64::from(self.hour)),
            Column::BookingCount => Some(f64::from(self.booking_count)),
            _ => None,
        }
    }

    /// Textual value of any column, used for membership filtering.
    pub fn text(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Date => Cow::Owned(self.date.format("%Y-%m-%d").to_string()),
            Column::Time => Cow::Owned(self.time.format("%H:%M:%S").to_string()),
            Column::Hour => Cow::Owned(self.hour.to_string()),
            Column::VehicleType => Cow::Borrowed(&self.vehicle_type),
            Column::PickupLocation => Cow::Borrowed(&self.pickup_location),
            Column::DropLocation => Cow::Borrowed(&self.drop_location),
            Column::CustomerId => Cow::Borrowed(&self.customer_id),
            Column::PaymentMethod => Cow::Borrowed(&self.payment_method),
            Column::BookingStatus => Cow::Borrowed(&self.booking_status),
            Column::BookingValue => Cow::Owned(self.booking_value.to_string()),
            Column::RideDistance => Cow::Owned(self.ride_distance.to_string()),
            Column::DriverRatings => Cow::Owned(self.driver_rating.to_string()),
            Column::CustomerRating => Cow::Owned(self.customer_rating.to_string()),
            Column::BookingCount => Cow::Owned(self.booking_count.to_string()),
        }
    }
}

/// The immutable base table. Filtering never touches it; it only hands out views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rides: Vec<RideRecord>,
}

impl Dataset {
    pub fn new(rides: Vec<RideRecord>) -> Self {
        Self { rides }
    }

    pub fn rides(&self) -> &[RideRecord] {
        &self.rides
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// A view over every row.
    pub fn view(&self) -> RideView<'_> {
        RideView {
            rows: self.rides.iter().collect(),
        }
    }
}

/// A subset of dataset rows, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideView<'a> {
    rows: Vec<&'a RideRecord>,
}

impl<'a> RideView<'a> {
    pub fn rows(&self) -> &[&'a RideRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RideRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the rows matching `keep`, producing a new view.
    pub fn retain_where(&self, mut keep: impl FnMut(&RideRecord) -> bool) -> RideView<'a> {
        RideView {
            rows: self.rows.iter().copied().filter(|r| keep(r)).collect(),
        }
    }
}
