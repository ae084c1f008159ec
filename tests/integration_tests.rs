use ride_dashboard::analyzers::aggregate::{build_report, kpis, revenue_by_vehicle_type};
use ride_dashboard::cache::DatasetCache;
use ride_dashboard::filter::{FilterState, Selection};
use ride_dashboard::loader::load_dataset;
use ride_dashboard::model::{Column, UNKNOWN};
use ride_dashboard::output::{export_view, format_distance};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rides_sample.csv")
}

fn state(dimension: &str, relations: &[(&str, &str)]) -> FilterState {
    let mut state = FilterState::for_dimension(dimension);
    for (name, values) in relations {
        state
            .relations
            .insert(name.to_string(), Selection::parse(values));
    }
    state
}

#[test]
fn test_load_fixture_normalizes_and_imputes() {
    let ds = load_dataset(&fixture()).expect("Failed to load fixture");
    assert_eq!(ds.len(), 10);

    let categoricals = [
        Column::VehicleType,
        Column::PickupLocation,
        Column::DropLocation,
        Column::CustomerId,
        Column::PaymentMethod,
        Column::BookingStatus,
    ];
    for ride in ds.rides() {
        for column in categoricals {
            let value = ride.text(column);
            assert!(!value.is_empty());
            assert_eq!(value.trim(), value);
        }
        assert!(ride.booking_value.is_finite());
        assert!(ride.ride_distance.is_finite());
        assert!(ride.driver_rating.is_finite());
        assert!(ride.customer_rating.is_finite());
        assert!(ride.hour < 24);
    }

    let rides = ds.rides();
    assert_eq!(rides[5].vehicle_type, "eBike");
    assert_eq!(rides[7].customer_id, UNKNOWN);
    assert_eq!(rides[7].pickup_location, UNKNOWN);
    assert_eq!(rides[7].booking_value, 0.0);
    assert!((rides[1].driver_rating - 4.1625).abs() < 1e-9);
    assert!((rides[4].customer_rating - 4.375).abs() < 1e-9);
    assert_eq!(rides[9].hour, 23);
}

#[test]
fn test_all_data_kpis() {
    let ds = load_dataset(&fixture()).unwrap();
    let eval = FilterState::default().evaluate(&ds).unwrap();
    let k = kpis(&eval.view);

    assert_eq!(k.total_bookings, 10);
    assert!((k.total_revenue - 4965.0).abs() < 1e-9);
    assert!((k.success_rate - 70.0).abs() < 1e-9);
    assert!((k.avg_distance_km.unwrap() - 16.301).abs() < 1e-9);

    let grouped: f64 = revenue_by_vehicle_type(&eval.view)
        .iter()
        .map(|g| g.total)
        .sum();
    assert!((grouped - k.total_revenue).abs() < 1e-9);
}

#[test]
fn test_vehicle_type_filter() {
    let ds = load_dataset(&fixture()).unwrap();
    let mut filter = state("Vehicle Type", &[]);
    filter.values = Selection::parse("Auto");

    let eval = filter.evaluate(&ds).unwrap();
    let report = build_report(&filter.dimension, &eval);

    assert_eq!(report.kpis.total_bookings, 3);
    assert!((report.kpis.total_revenue - 480.0).abs() < 1e-9);
    assert_eq!(report.revenue_by_vehicle_type.len(), 1);
    assert_eq!(eval.applied[0].name, "Vehicle Type");
}

#[test]
fn test_default_pickup_selection_excludes_unknown() {
    let ds = load_dataset(&fixture()).unwrap();
    let eval = state("Pickup Location", &[]).evaluate(&ds).unwrap();
    assert_eq!(eval.view.len(), 9);
    assert!(eval.view.iter().all(|r| r.pickup_location != UNKNOWN));
}

#[test]
fn test_distance_buckets_on_fixture() {
    let ds = load_dataset(&fixture()).unwrap();
    let count = |bucket: &str| {
        state("Pickup Location", &[("Distance Range", bucket)])
            .evaluate(&ds)
            .unwrap()
            .view
            .len()
    };

    assert_eq!(count("short"), 5);
    assert_eq!(count("medium"), 2);
    assert_eq!(count("long"), 2);
    assert_eq!(count("short,long"), 7);
    assert_eq!(count("none"), 9);
}

#[test]
fn test_empty_result_is_well_defined() {
    let ds = load_dataset(&fixture()).unwrap();
    let mut filter = state("Vehicle Type", &[]);
    filter.values = Selection::parse("Rickshaw");

    let eval = filter.evaluate(&ds).unwrap();
    let k = kpis(&eval.view);

    assert!(eval.view.is_empty());
    assert_eq!(k.total_revenue, 0.0);
    assert_eq!(k.total_bookings, 0);
    assert_eq!(k.success_rate, 0.0);
    assert_eq!(format_distance(k.avg_distance_km), "0 km");
    assert_eq!(ds.len(), 10);
}

#[test]
fn test_export_round_trip_row_count() {
    let ds = load_dataset(&fixture()).unwrap();
    let eval = state("Payment Method", &[("Value Range", "high")])
        .evaluate(&ds)
        .unwrap();
    assert_eq!(eval.view.len(), 2);

    let dir = std::env::temp_dir().join("ride_dashboard_integration_export");
    let _ = std::fs::remove_dir_all(&dir);
    let path = export_view(&eval.view, &dir, false).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.len(), 14);
    assert_eq!(rdr.records().count(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_global_cache_reuses_dataset() {
    let cache = DatasetCache::global();
    let first = cache.get_or_load(&fixture()).unwrap();
    let second = cache.get_or_load(&fixture()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_preset_file_filters_fixture() {
    let preset = Path::new(env!("CARGO_MANIFEST_DIR")).join("presets/upi_short_rides.json");
    let filter = FilterState::load(&preset).unwrap();
    let ds = load_dataset(&fixture()).unwrap();

    let eval = filter.evaluate(&ds).unwrap();
    assert_eq!(eval.view.len(), 2);
    assert!(eval.view.iter().all(|r| r.payment_method == "UPI" && r.ride_distance <= 15.0));
}
