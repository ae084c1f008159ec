use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

use crate::analyzers::types::{
    DashboardReport, DateCount, GroupCount, GroupTotal, HourCount, Kpis, RatingComparison,
};
use crate::analyzers::utility::{mean_opt, pct};
use crate::filter::Evaluation;
use crate::model::{Column, RideView, SUCCESS_STATUS};

pub fn total_revenue(view: &RideView<'_>) -> f64 {
    view.iter().map(|r| r.booking_value).sum()
}

pub fn total_bookings(view: &RideView<'_>) -> usize {
    view.len()
}

/// Share of rides with status "Success", as a percentage. 0 for an empty view.
pub fn success_rate(view: &RideView<'_>) -> f64 {
    let successes = view
        .iter()
        .filter(|r| r.booking_status == SUCCESS_STATUS)
        .count();
    pct(successes, view.len())
}

pub fn average_distance(view: &RideView<'_>) -> Option<f64> {
    mean_opt(view.iter().map(|r| r.ride_distance))
}

pub fn kpis(view: &RideView<'_>) -> Kpis {
    Kpis {
        total_revenue: total_revenue(view),
        total_bookings: total_bookings(view),
        success_rate: success_rate(view),
        avg_distance_km: average_distance(view),
    }
}

/// Booking value summed per vehicle type, ordered by vehicle type.
pub fn revenue_by_vehicle_type(view: &RideView<'_>) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in view.iter() {
        *totals.entry(r.vehicle_type.as_str()).or_default() += r.booking_value;
    }

    totals
        .into_iter()
        .map(|(group, total)| GroupTotal {
            group: group.to_string(),
            total,
        })
        .collect()
}

/// Row counts per value of a categorical column, most frequent first.
pub fn value_counts(view: &RideView<'_>, column: Column) -> Vec<GroupCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.text(column).into_owned()).or_default() += 1;
    }

    let mut counts: Vec<GroupCount> = counts
        .into_iter()
        .map(|(group, count)| GroupCount { group, count })
        .collect();
    // stable sort keeps ties in name order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn count_by_status(view: &RideView<'_>) -> Vec<GroupCount> {
    value_counts(view, Column::BookingStatus)
}

pub fn count_by_payment_method(view: &RideView<'_>) -> Vec<GroupCount> {
    value_counts(view, Column::PaymentMethod)
}

pub fn count_by_date(view: &RideView<'_>) -> Vec<DateCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.date).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, rides)| DateCount { date, rides })
        .collect()
}

/// Rides per hour of day. Hours with no rides are omitted.
pub fn count_by_hour(view: &RideView<'_>) -> Vec<HourCount> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for r in view.iter() {
        *counts.entry(r.hour).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(hour, rides)| HourCount { hour, rides })
        .collect()
}

pub fn average_ratings(view: &RideView<'_>) -> RatingComparison {
    RatingComparison {
        driver: mean_opt(view.iter().map(|r| r.driver_rating)),
        customer: mean_opt(view.iter().map(|r| r.customer_rating)),
    }
}

/// Builds the full dashboard for an evaluated filter state.
pub fn build_report(dimension: &str, evaluation: &Evaluation<'_>) -> DashboardReport {
    let view = &evaluation.view;

    DashboardReport {
        generated_at: Utc::now(),
        dimension: dimension.to_string(),
        applied_filters: evaluation.applied.clone(),
        kpis: kpis(view),
        revenue_by_vehicle_type: revenue_by_vehicle_type(view),
        booking_status: count_by_status(view),
        daily_rides: count_by_date(view),
        hourly_demand: count_by_hour(view),
        payment_methods: count_by_payment_method(view),
        ratings: average_ratings(view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply;
    use crate::model::Dataset;
    use crate::model::fixtures::ride;

    fn two_rides() -> Dataset {
        Dataset::new(vec![
            ride("Auto", "Success", 100.0),
            ride("Bike", "Cancelled by Driver", 50.0),
        ])
    }

    #[test]
    fn test_kpis_two_rides() {
        let ds = two_rides();
        let k = kpis(&ds.view());

        assert_eq!(k.total_revenue, 150.0);
        assert_eq!(k.total_bookings, 2);
        assert_eq!(k.success_rate, 50.0);
        assert_eq!(k.avg_distance_km, Some(10.0));
    }

    #[test]
    fn test_kpis_after_vehicle_filter() {
        let ds = two_rides();
        let view = apply(&ds.view(), Some(Column::VehicleType), &["Auto"]);
        let k = kpis(&view);

        assert_eq!(view.len(), 1);
        assert_eq!(k.total_revenue, 100.0);
        assert_eq!(k.success_rate, 100.0);
    }

    #[test]
    fn test_empty_view_is_well_defined() {
        let ds = Dataset::default();
        let view = ds.view();
        let k = kpis(&view);

        assert_eq!(k.total_revenue, 0.0);
        assert_eq!(k.total_bookings, 0);
        assert_eq!(k.success_rate, 0.0);
        assert_eq!(k.avg_distance_km, None);

        assert!(revenue_by_vehicle_type(&view).is_empty());
        assert!(count_by_status(&view).is_empty());
        assert!(count_by_date(&view).is_empty());
        assert!(count_by_hour(&view).is_empty());
        assert!(count_by_payment_method(&view).is_empty());
        assert_eq!(
            average_ratings(&view),
            RatingComparison {
                driver: None,
                customer: None
            }
        );
    }

    #[test]
    fn test_revenue_groups_sum_to_total() {
        let ds = Dataset::new(vec![
            ride("Auto", "Success", 100.25),
            ride("Bike", "Success", 50.5),
            ride("Auto", "Incomplete", 0.1),
            ride("Prime SUV", "Success", 999.9),
        ]);
        let view = ds.view();

        let grouped: f64 = revenue_by_vehicle_type(&view).iter().map(|g| g.total).sum();
        assert!((grouped - total_revenue(&view)).abs() < 1e-9);
    }

    #[test]
    fn test_value_counts_most_frequent_first() {
        let ds = Dataset::new(vec![
            ride("Auto", "Incomplete", 1.0),
            ride("Auto", "Success", 1.0),
            ride("Auto", "Success", 1.0),
            ride("Auto", "Cancelled by Customer", 1.0),
        ]);

        let counts = count_by_status(&ds.view());
        let groups: Vec<_> = counts.iter().map(|c| (c.group.as_str(), c.count)).collect();
        assert_eq!(
            groups,
            vec![
                ("Success", 2),
                ("Cancelled by Customer", 1),
                ("Incomplete", 1)
            ]
        );
    }

    #[test]
    fn test_count_by_hour_and_date() {
        let mut late = ride("Auto", "Success", 1.0);
        late.hour = 23;
        late.date = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
        let ds = Dataset::new(vec![ride("Auto", "Success", 1.0), late.clone(), late]);

        let hours = count_by_hour(&ds.view());
        assert_eq!(
            hours,
            vec![HourCount { hour: 10, rides: 1 }, HourCount { hour: 23, rides: 2 }]
        );

        let days = count_by_date(&ds.view());
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].rides, 2);
    }

    #[test]
    fn test_average_ratings() {
        let mut other = ride("Auto", "Success", 1.0);
        other.driver_rating = 3.5;
        other.customer_rating = 5.0;
        let ds = Dataset::new(vec![ride("Auto", "Success", 1.0), other]);

        let ratings = average_ratings(&ds.view());
        assert_eq!(ratings.driver, Some(4.0));
        assert_eq!(ratings.customer, Some(4.5));
    }
}
