//! Data types produced by the aggregation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::filter::AppliedFilter;

/// Headline figures shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_bookings: usize,
    pub success_rate: f64,
    /// `None` when there are no rides to average.
    pub avg_distance_km: Option<f64>,
}

/// A summed measure for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub group: String,
    pub total: f64,
}

/// A row count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub rides: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub rides: usize,
}

/// Mean driver rating against mean customer rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingComparison {
    pub driver: Option<f64>,
    pub customer: Option<f64>,
}

/// Everything the dashboard renders for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub dimension: String,
    pub applied_filters: Vec<AppliedFilter>,
    pub kpis: Kpis,
    pub revenue_by_vehicle_type: Vec<GroupTotal>,
    pub booking_status: Vec<GroupCount>,
    pub daily_rides: Vec<DateCount>,
    pub hourly_demand: Vec<HourCount>,
    pub payment_methods: Vec<GroupCount>,
    pub ratings: RatingComparison,
}
