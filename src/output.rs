//! Report rendering and CSV export of filtered rides.
//!
//! Supports a plain-text dashboard, JSON serialization, and CSV export
//! (optionally gzip-compressed) to a timestamped file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{DashboardReport, GroupCount, Kpis};
use crate::dimensions::ALL_DATA;
use crate::model::RideView;

const NO_DATA: &str = "No data available for selected filters";

/// Formats an integer with comma thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Currency with no decimals, e.g. `₹1,234,568`.
pub fn format_revenue(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₹{}", group_thousands(rounded.abs() as u64))
}

/// Average distance, or `0 km` when there is nothing to average.
pub fn format_distance(avg: Option<f64>) -> String {
    match avg {
        Some(km) if km.is_finite() => format!("{km:.1} km"),
        _ => "0 km".to_string(),
    }
}

/// Caption describing which slice of the data is shown.
pub fn caption(dimension: &str, rides: usize) -> String {
    if dimension == ALL_DATA {
        format!("Analyzing: Complete Dataset | Data Points: {} rides", group_thousands(rides as u64))
    } else {
        format!(
            "Analyzing by: {dimension} | Data Points: {} rides",
            group_thousands(rides as u64)
        )
    }
}

fn kpi_lines(out: &mut String, kpis: &Kpis) -> std::fmt::Result {
    let revenue_delta = if kpis.total_revenue > 0.0 {
        format!("{:.1}M", kpis.total_revenue / 1_000_000.0)
    } else {
        "0".to_string()
    };
    let bookings_delta = if kpis.total_bookings > 0 {
        format!("{:.1}K", kpis.total_bookings as f64 / 1000.0)
    } else {
        "0".to_string()
    };

    writeln!(out, "  Total Revenue:   {:>14}  ({revenue_delta})", format_revenue(kpis.total_revenue))?;
    writeln!(
        out,
        "  Total Bookings:  {:>14}  ({bookings_delta})",
        group_thousands(kpis.total_bookings as u64)
    )?;
    writeln!(out, "  Success Rate:    {:>13.1}%  (Target: 85%)", kpis.success_rate)?;
    writeln!(out, "  Avg Distance:    {:>14}", format_distance(kpis.avg_distance_km))
}

fn count_lines(out: &mut String, title: &str, counts: &[GroupCount]) -> std::fmt::Result {
    writeln!(out, "\n{title}")?;
    if counts.is_empty() {
        return writeln!(out, "  {NO_DATA}");
    }
    for c in counts {
        writeln!(out, "  {:<24} {:>10}", c.group, group_thousands(c.count as u64))?;
    }
    Ok(())
}

/// Renders the dashboard as plain text.
pub fn render_report(report: &DashboardReport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &DashboardReport) -> std::fmt::Result {
    writeln!(out, "{}", caption(&report.dimension, report.kpis.total_bookings))?;
    for f in &report.applied_filters {
        writeln!(out, "  filter {}: {} ({} rides)", f.name, f.selected.join(", "), f.rows_after)?;
    }
    writeln!(out)?;
    kpi_lines(out, &report.kpis)?;

    writeln!(out, "\nRevenue by Vehicle Type")?;
    if report.revenue_by_vehicle_type.is_empty() {
        writeln!(out, "  {NO_DATA}")?;
    }
    for g in &report.revenue_by_vehicle_type {
        writeln!(out, "  {:<24} {:>14}", g.group, format_revenue(g.total))?;
    }

    count_lines(out, "Booking Status Distribution", &report.booking_status)?;

    writeln!(out, "\nDaily Ride Trends")?;
    if report.daily_rides.is_empty() {
        writeln!(out, "  {NO_DATA}")?;
    }
    for d in &report.daily_rides {
        writeln!(out, "  {}  {:>8}", d.date.format("%Y-%m-%d"), d.rides)?;
    }

    writeln!(out, "\nHourly Demand Pattern")?;
    if report.hourly_demand.is_empty() {
        writeln!(out, "  {NO_DATA}")?;
    }
    for h in &report.hourly_demand {
        writeln!(out, "  {:02}:00  {:>8}", h.hour, h.rides)?;
    }

    count_lines(out, "Payment Method Distribution", &report.payment_methods)?;

    writeln!(out, "\nAverage Ratings Comparison")?;
    match (report.ratings.driver, report.ratings.customer) {
        (None, None) => writeln!(out, "  {NO_DATA}")?,
        (driver, customer) => {
            writeln!(out, "  Driver Rating     {:.2}", driver.unwrap_or(0.0))?;
            writeln!(out, "  Customer Rating   {:.2}", customer.unwrap_or(0.0))?;
        }
    }

    Ok(())
}

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &DashboardReport) {
    debug!("{:#?}", report);
}

/// Serializes a report as pretty-printed JSON.
pub fn to_json(report: &DashboardReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// File name for an export taken at `now`.
pub fn export_filename(now: DateTime<Local>) -> String {
    format!("ola_filtered_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Writes every ride in `view` as CSV with a header row.
pub fn write_csv<W: Write>(view: &RideView<'_>, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for ride in view.iter() {
        writer.serialize(ride)?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports `view` into `dir` under a timestamped name and returns the path.
///
/// With `gzip` the file is compressed and gets a `.gz` suffix.
#[tracing::instrument(skip(view), fields(rows = view.len()))]
pub fn export_view(view: &RideView<'_>, dir: &Path, gzip: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let mut path = dir.join(export_filename(Local::now()));
    if gzip {
        path.set_extension("csv.gz");
    }

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(view, &mut encoder)?;
        encoder.finish()?;
    } else {
        write_csv(view, file)?;
    }

    info!(path = %path.display(), "Filtered rides exported");
    Ok(path)
}
