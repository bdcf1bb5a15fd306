//! Output formatting and persistence for query results.
//!
//! Supports a plain-text dashboard report, pretty-printing, JSON
//! serialization, CSV export of the filtered table and CSV append of summaries.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::query::{QueryResult, QuerySummary};
use crate::record::EnrichedRecord;
use crate::stats::pct;

/// Widest bar drawn in a text chart.
const BAR_WIDTH: usize = 40;

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &QuerySummary) {
    debug!("{:#?}", summary);
}

/// Logs a summary as pretty-printed JSON.
pub fn print_json(summary: &QuerySummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// One flat CSV row per summary; the mappings are left out.
#[derive(Debug, Serialize)]
struct SummaryRow {
    generated_at: DateTime<Utc>,
    total_records: usize,
    filtered_records: usize,
    average_speed: Option<f64>,
    average_congestion: Option<f64>,
    peak_record_count: usize,
    incident_count: usize,
}

impl From<&QuerySummary> for SummaryRow {
    fn from(s: &QuerySummary) -> Self {
        SummaryRow {
            generated_at: s.generated_at,
            total_records: s.total_records,
            filtered_records: s.filtered_records,
            average_speed: s.average_speed,
            average_congestion: s.average_congestion,
            peak_record_count: s.peak_record_count,
            incident_count: s.incident_count,
        }
    }
}

/// Appends a [`QuerySummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &str, summary: &QuerySummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending summary row");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(SummaryRow::from(summary))?;
    writer.flush()?;

    Ok(())
}

/// Writes the filtered, enriched table to a new CSV file at `path`.
///
/// Source columns keep their input names, so the file is itself a valid
/// input; the derived columns are ignored on reload and recomputed.
/// Returns the number of rows written.
pub fn write_records(path: &str, records: &[&EnrichedRecord]) -> Result<usize> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "Records exported");
    Ok(records.len())
}

/// Renders the dashboard as text: table preview, quick stats and charts.
pub fn render_report<W: Write>(result: &QueryResult<'_>, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "Filtered Data Preview ({} of {} records)",
        result.filtered_records.len(),
        result.total_records
    )?;
    writeln!(
        out,
        "{:>4}  {:<16}  {:<10}  {:<9}  {:<7}  {:>6}  {:>10}  {:<9}  {:<10}  {:<12}",
        "ID", "Timestamp", "City", "Vehicle", "Weather", "Speed", "Congestion", "Hour Type",
        "Speed Band", "Incident"
    )?;
    for r in &result.filtered_records {
        writeln!(
            out,
            "{:>4}  {:<16}  {:<10}  {:<9}  {:<7}  {:>6}  {:>10}  {:<9}  {:<10}  {:<12}",
            r.record_id,
            r.timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.city,
            r.vehicle_type,
            r.weather_condition,
            number(r.speed_kmph, 0),
            number(r.congestion_index, 0),
            r.peak_hour.as_str(),
            r.speed_category.map_or("-", |c| c.as_str()),
            r.incident_type,
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Quick Stats")?;
    writeln!(out, "  Avg Speed:         {}", with_unit(result.average_speed, "km/h"))?;
    writeln!(out, "  Avg Congestion:    {}", number(result.average_congestion, 1))?;
    writeln!(
        out,
        "  Peak Hour Records: {} ({:.1}%)",
        result.peak_record_count,
        pct(result.peak_record_count, result.filtered_records.len())
    )?;
    writeln!(out, "  Incidents:         {}", result.incident_count)?;

    let speeds: Vec<(String, f64)> = result
        .speed_series
        .iter()
        .map(|(id, speed)| (id.to_string(), *speed))
        .collect();
    write_chart(out, "Speed Distribution", &speeds, 0)?;

    let vehicles: Vec<(String, f64)> = result
        .vehicle_type_counts
        .iter()
        .map(|(vehicle, count)| (vehicle.clone(), *count as f64))
        .collect();
    write_chart(out, "Vehicle Count by Type", &vehicles, 0)?;

    let weather: Vec<(String, f64)> = result
        .congestion_by_weather
        .iter()
        .map(|(condition, congestion)| (condition.clone(), *congestion))
        .collect();
    write_chart(out, "Weather Impact (avg congestion)", &weather, 1)?;

    Ok(())
}

fn write_chart<W: Write>(
    out: &mut W,
    title: &str,
    rows: &[(String, f64)],
    precision: usize,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;

    if rows.is_empty() {
        writeln!(out, "  (no data)")?;
        return Ok(());
    }

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    for (label, value) in rows {
        writeln!(
            out,
            "  {label:<label_width$} | {} {value:.precision$}",
            bar(*value, max)
        )?;
    }

    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.max(1))
}

fn number(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} {unit}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use crate::loader::load_source;
    use crate::pipeline::enrich;
    use crate::query::FilterSelection;
    use crate::sample;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn render(result: &QueryResult<'_>) -> String {
        let mut buf = Vec::new();
        render_report(result, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let dashboard = Dashboard::new(&sample::records());
        let summary = dashboard.query(&dashboard.default_selection()).summary();
        print_pretty(&summary);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let dashboard = Dashboard::new(&sample::records());
        let summary = dashboard.query(&dashboard.default_selection()).summary();
        print_json(&summary).unwrap();
    }

    #[test]
    fn test_report_contains_metrics_and_charts() {
        let dashboard = Dashboard::new(&sample::records());
        let text = render(&dashboard.query(&dashboard.default_selection()));

        assert!(text.contains("Filtered Data Preview (10 of 10 records)"));
        assert!(text.contains("Avg Speed:         42.3 km/h"));
        assert!(text.contains("Incidents:         4"));
        assert!(text.contains("Vehicle Count by Type"));
        assert!(text.contains("Weather Impact"));
        assert!(text.contains("Peak Hour Records: 2 (20.0%)"));
    }

    #[test]
    fn test_report_for_empty_selection() {
        let dashboard = Dashboard::new(&sample::records());
        let text = render(&dashboard.query(&FilterSelection::default()));

        assert!(text.contains("(0 of 10 records)"));
        assert!(text.contains("Avg Speed:         n/a"));
        assert!(text.contains("Avg Congestion:    n/a"));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(10.0, 10.0).len(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).len(), BAR_WIDTH / 2);
        assert_eq!(bar(0.01, 10.0).len(), 1);
        assert!(bar(0.0, 10.0).is_empty());
        assert!(bar(3.0, 0.0).is_empty());
    }

    #[test]
    fn test_write_records_exports_filtered_rows() {
        let path = temp_path("mobility_insights_test_export.csv");
        let _ = fs::remove_file(&path);

        let dashboard = Dashboard::new(&sample::records());
        let result = dashboard.query(&dashboard.default_selection());
        let written = write_records(&path, &result.filtered_records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(written, 10);
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("Record_ID,Timestamp,City,Camera_ID"));
        assert!(lines[0].ends_with("Peak_Hour,Speed_Category,Is_Congested,Delay_Factor"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_exported_records_load_back() {
        let path = temp_path("mobility_insights_test_reload.csv");
        let _ = fs::remove_file(&path);

        let dashboard = Dashboard::new(&sample::records());
        let result = dashboard.query(&dashboard.default_selection());
        write_records(&path, &result.filtered_records).unwrap();

        let reloaded = enrich(&load_source(&path).unwrap());
        assert_eq!(reloaded, dashboard.records());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_summary_writes_header_once() {
        let path = temp_path("mobility_insights_test_summary.csv");
        let _ = fs::remove_file(&path);

        let dashboard = Dashboard::new(&sample::records());
        let summary = dashboard.query(&dashboard.default_selection()).summary();
        append_summary(&path, &summary).unwrap();
        append_summary(&path, &summary).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.contains("generated_at"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }
}
