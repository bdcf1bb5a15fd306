//! Feature pipeline: cleaning, categorical normalization, binning and
//! computed columns.
//!
//! Every step degrades a malformed field to a null value instead of failing,
//! so one bad row never aborts the batch.

use chrono::{NaiveDateTime, Timelike};
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

use crate::error::FieldIssue;
use crate::normalize::{
    canonical_text, fold_vehicle, fold_weather, parse_flag, parse_timestamp, strip_incident,
};
use crate::record::{EnrichedRecord, PeakHour, RawRecord, SpeedCategory};

/// Hours (inclusive) counted as rush hour.
pub const PEAK_HOURS: [RangeInclusive<u32>; 2] = [8..=11, 17..=20];

/// Congestion index at or above which a record is congested.
pub const CONGESTION_THRESHOLD: f64 = 70.0;

/// Upper bin edges; each bin is open on the left and closed on the right.
static SPEED_BINS: &[(f64, SpeedCategory)] = &[
    (20.0, SpeedCategory::VerySlow),
    (40.0, SpeedCategory::Slow),
    (60.0, SpeedCategory::Normal),
    (120.0, SpeedCategory::Fast),
];

const SPEED_MIN: f64 = 0.0;
const SPEED_MAX: f64 = 120.0;

/// An issue tied to the record it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIssue {
    pub record_id: u64,
    pub issue: FieldIssue,
}

/// Output of [`enrich_with_issues`].
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub records: Vec<EnrichedRecord>,
    pub issues: Vec<RecordIssue>,
}

/// Enriches a batch of raw records, preserving their order.
pub fn enrich(records: &[RawRecord]) -> Vec<EnrichedRecord> {
    enrich_with_issues(records).records
}

/// Enriches a batch and reports every field that had to be degraded.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn enrich_with_issues(records: &[RawRecord]) -> Enrichment {
    let mut out = Enrichment {
        records: Vec::with_capacity(records.len()),
        issues: Vec::new(),
    };

    for raw in records {
        let mut issues = Vec::new();
        out.records.push(enrich_record(raw, &mut issues));

        for issue in issues {
            debug!(record_id = raw.record_id, %issue, "Recovered malformed field");
            out.issues.push(RecordIssue {
                record_id: raw.record_id,
                issue,
            });
        }
    }

    if !out.issues.is_empty() {
        warn!(
            issues = out.issues.len(),
            "Some fields were degraded to null during enrichment"
        );
    }
    info!(records = out.records.len(), "Enrichment complete");

    out
}

fn enrich_record(raw: &RawRecord, issues: &mut Vec<FieldIssue>) -> EnrichedRecord {
    let timestamp = parse_timestamp(&raw.timestamp);
    if timestamp.is_none() {
        issues.push(FieldIssue::ParseFailure {
            field: "Timestamp",
            value: raw.timestamp.clone(),
        });
    }

    let fine_issued = parse_flag(&raw.fine_issued);
    if fine_issued.is_none() && !raw.fine_issued.trim().is_empty() {
        issues.push(FieldIssue::ParseFailure {
            field: "Fine_Issued",
            value: raw.fine_issued.clone(),
        });
    }

    let speed_kmph = finite("Speed_KMPH", raw.speed_kmph, issues);
    let road_occupancy_percent =
        finite("Road_Occupancy_Percent", raw.road_occupancy_percent, issues);
    let congestion_index = finite("Congestion_Index", raw.congestion_index, issues);
    let travel_delay_minutes = finite("Travel_Delay_Minutes", raw.travel_delay_minutes, issues);

    let speed_category = match speed_kmph.map(speed_category) {
        Some(Ok(category)) => Some(category),
        Some(Err(issue)) => {
            issues.push(issue);
            None
        }
        None => None,
    };

    let hour = timestamp.map(|t| t.hour());

    EnrichedRecord {
        record_id: raw.record_id,
        timestamp,
        city: canonical_text(&raw.city),
        camera_id: raw.camera_id,
        road_type: canonical_text(&raw.road_type),
        direction: canonical_text(&raw.direction),
        vehicle_type: fold_vehicle(&canonical_text(&raw.vehicle_type)),
        speed_kmph,
        road_occupancy_percent,
        congestion_index,
        travel_delay_minutes,
        weather_condition: fold_weather(&canonical_text(&raw.weather_condition)),
        incident_type: strip_incident(&canonical_text(&raw.incident_type)),
        fine_issued,
        license_plate: canonical_text(&raw.license_plate).to_uppercase(),
        hour,
        day: timestamp.map(day_name),
        month: timestamp.map(month_name),
        peak_hour: peak_hour(hour),
        speed_category,
        is_congested: is_congested(congestion_index),
        delay_factor: delay_factor(travel_delay_minutes, speed_kmph),
    }
}

/// Drops `NaN` and infinite measurements, which `f64` parsing lets through.
fn finite(field: &'static str, value: Option<f64>, issues: &mut Vec<FieldIssue>) -> Option<f64> {
    match value {
        Some(v) if !v.is_finite() => {
            issues.push(FieldIssue::ParseFailure {
                field,
                value: v.to_string(),
            });
            None
        }
        other => other,
    }
}

fn day_name(timestamp: NaiveDateTime) -> String {
    timestamp.format("%A").to_string()
}

fn month_name(timestamp: NaiveDateTime) -> String {
    timestamp.format("%B").to_string()
}

/// Classifies an hour of day. A missing hour is [`PeakHour::OffPeak`].
pub fn peak_hour(hour: Option<u32>) -> PeakHour {
    match hour {
        Some(h) if PEAK_HOURS.iter().any(|range| range.contains(&h)) => PeakHour::Peak,
        _ => PeakHour::OffPeak,
    }
}

/// Bins a speed in km/h.
///
/// # Errors
///
/// Returns [`FieldIssue::OutOfRange`] for speeds outside (0, 120], including NaN.
pub fn speed_category(speed: f64) -> Result<SpeedCategory, FieldIssue> {
    if speed > SPEED_MIN {
        if let Some((_, category)) = SPEED_BINS.iter().find(|(upper, _)| speed <= *upper) {
            return Ok(*category);
        }
    }

    Err(FieldIssue::OutOfRange {
        field: "Speed_KMPH",
        value: speed,
        min: SPEED_MIN,
        max: SPEED_MAX,
    })
}

pub fn is_congested(congestion_index: Option<f64>) -> bool {
    congestion_index.is_some_and(|c| c >= CONGESTION_THRESHOLD)
}

/// Travel delay per unit of speed, `delay / (speed + 1)`.
///
/// `None` when either input is missing or the divisor is zero.
pub fn delay_factor(delay_minutes: Option<f64>, speed_kmph: Option<f64>) -> Option<f64> {
    let delay = delay_minutes?;
    let divisor = speed_kmph? + 1.0;
    if divisor == 0.0 {
        return None;
    }
    Some(delay / divisor)
}
