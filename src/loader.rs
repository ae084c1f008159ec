//! CSV loader for the bookings dataset.
//!
//! Dates and times must parse or the whole load fails. Numeric measures are
//! coerced: booking value falls back to 0, ratings and distance fall back to
//! the column mean over the values that did parse. Categorical columns are
//! trimmed and null-like tokens collapse to [`UNKNOWN`].

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::analyzers::utility::mean;
use crate::model::{Dataset, RideRecord, UNKNOWN};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Raw tokens treated as a missing category.
const NULL_TOKENS: &[&str] = &["", "nan", "NaN", "None", "null", "NULL"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to open dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid date '{value}', expected DD/MM/YYYY")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid time '{value}', expected HH:MM:SS")]
    InvalidTime { line: u64, value: String },
}

/// One CSV row as text. Extra columns in the file are ignored.
#[derive(Debug, Deserialize)]
struct RawRide {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Vehicle Type")]
    vehicle_type: String,
    #[serde(rename = "Pickup Location")]
    pickup_location: String,
    #[serde(rename = "Drop Location")]
    drop_location: String,
    #[serde(rename = "Customer ID")]
    customer_id: String,
    #[serde(rename = "Payment Method")]
    payment_method: String,
    #[serde(rename = "Booking Status")]
    booking_status: String,
    #[serde(rename = "Booking Value")]
    booking_value: String,
    #[serde(rename = "Ride Distance")]
    ride_distance: String,
    #[serde(rename = "Driver Ratings")]
    driver_rating: String,
    #[serde(rename = "Customer Rating")]
    customer_rating: String,
}

/// A row with parsed date/time and coerced, not yet imputed, measures.
struct PartialRide {
    date: NaiveDate,
    time: NaiveTime,
    vehicle_type: String,
    pickup_location: String,
    drop_location: String,
    customer_id: String,
    payment_method: String,
    booking_status: String,
    booking_value: Option<f64>,
    ride_distance: Option<f64>,
    driver_rating: Option<f64>,
    customer_rating: Option<f64>,
}

/// Loads the dataset from a CSV file on disk.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = from_reader(file)?;
    info!(rows = dataset.len(), "Dataset loaded");
    Ok(dataset)
}

/// Loads the dataset from any CSV byte source with a header row.
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut partials = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRide = record.deserialize(Some(&headers))?;
        partials.push(parse_row(raw, line)?);
    }

    let value_fill = 0.0;
    let distance_fill = column_mean(partials.iter().map(|p| p.ride_distance));
    let driver_fill = column_mean(partials.iter().map(|p| p.driver_rating));
    let customer_fill = column_mean(partials.iter().map(|p| p.customer_rating));

    debug!(
        missing_value = count_missing(partials.iter().map(|p| p.booking_value)),
        missing_distance = count_missing(partials.iter().map(|p| p.ride_distance)),
        missing_driver_rating = count_missing(partials.iter().map(|p| p.driver_rating)),
        missing_customer_rating = count_missing(partials.iter().map(|p| p.customer_rating)),
        distance_fill,
        driver_fill,
        customer_fill,
        "Imputing missing measures"
    );

    let rides = partials
        .into_iter()
        .map(|p| RideRecord {
            hour: p.time.hour(),
            date: p.date,
            time: p.time,
            vehicle_type: p.vehicle_type,
            pickup_location: p.pickup_location,
            drop_location: p.drop_location,
            customer_id: p.customer_id,
            payment_method: p.payment_method,
            booking_status: p.booking_status,
            booking_value: p.booking_value.unwrap_or(value_fill),
            ride_distance: p.ride_distance.unwrap_or(distance_fill),
            driver_rating: p.driver_rating.unwrap_or(driver_fill),
            customer_rating: p.customer_rating.unwrap_or(customer_fill),
            booking_count: 1,
        })
        .collect();

    Ok(Dataset::new(rides))
}

fn parse_row(raw: RawRide, line: u64) -> Result<PartialRide, LoadError> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT).map_err(|_| {
        LoadError::InvalidDate {
            line,
            value: raw.date.clone(),
        }
    })?;
    let time = NaiveTime::parse_from_str(raw.time.trim(), TIME_FORMAT).map_err(|_| {
        LoadError::InvalidTime {
            line,
            value: raw.time.clone(),
        }
    })?;

    Ok(PartialRide {
        date,
        time,
        vehicle_type: normalize_category(&raw.vehicle_type),
        pickup_location: normalize_category(&raw.pickup_location),
        drop_location: normalize_category(&raw.drop_location),
        customer_id: normalize_category(&raw.customer_id),
        payment_method: normalize_category(&raw.payment_method),
        booking_status: normalize_category(&raw.booking_status),
        booking_value: coerce_numeric(&raw.booking_value),
        ride_distance: coerce_numeric(&raw.ride_distance),
        driver_rating: coerce_numeric(&raw.driver_rating),
        customer_rating: coerce_numeric(&raw.customer_rating),
    })
}

/// Trims a category and maps null-like tokens to [`UNKNOWN`].
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if NULL_TOKENS.contains(&trimmed) {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a finite number; anything else counts as missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Mean over the values that parsed. A column with none falls back to 0.
fn column_mean(values: impl Iterator<Item = Option<f64>>) -> f64 {
    let valid: Vec<f64> = values.flatten().collect();
    mean(&valid)
}

fn count_missing(values: impl Iterator<Item = Option<f64>>) -> usize {
    values.filter(Option::is_none).count()
}
