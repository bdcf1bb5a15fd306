//! Filter & aggregate engine over enriched records.
//!
//! A [`FilterSelection`] picks a borrowed view of the record set; the
//! [`QueryResult`] carries that view together with the dashboard metrics and
//! chart series computed from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::record::{EnrichedRecord, PeakHour, SpeedCategory};
use crate::stats::{group_mean, mean, tally};

/// Incident type of records without an incident.
pub const NO_INCIDENT: &str = "None";

/// Rush-hour restriction of a selection.
///
/// Deserialization goes through [`FromStr`], so selection files accept the
/// same spellings as the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PeakFilter {
    #[default]
    All,
    Peak,
    #[serde(rename = "Off-Peak")]
    OffPeak,
}

impl PeakFilter {
    pub fn matches(&self, peak_hour: PeakHour) -> bool {
        match self {
            PeakFilter::All => true,
            PeakFilter::Peak => peak_hour == PeakHour::Peak,
            PeakFilter::OffPeak => peak_hour == PeakHour::OffPeak,
        }
    }
}

impl FromStr for PeakFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PeakFilter::All),
            "peak" => Ok(PeakFilter::Peak),
            "off-peak" | "offpeak" | "off_peak" => Ok(PeakFilter::OffPeak),
            other => Err(format!(
                "invalid peak filter '{other}', expected one of: all, peak, off-peak"
            )),
        }
    }
}

impl TryFrom<String> for PeakFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PeakFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeakFilter::All => "All",
            PeakFilter::Peak => "Peak",
            PeakFilter::OffPeak => "Off-Peak",
        })
    }
}

/// Distinct categorical values observed in a record set, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub vehicle_types: Vec<String>,
    pub weather_conditions: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut options = FilterOptions::default();
        for r in records {
            push_unique(&mut options.cities, &r.city);
            push_unique(&mut options.vehicle_types, &r.vehicle_type);
            push_unique(&mut options.weather_conditions, &r.weather_condition);
        }
        options
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// The user's current filter choices.
///
/// A record passes a categorical dimension iff its value is in the set, so an
/// empty set excludes every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub cities: BTreeSet<String>,
    pub vehicle_types: BTreeSet<String>,
    pub weather_conditions: BTreeSet<String>,
    pub peak: PeakFilter,
}

impl FilterSelection {
    /// Selects every known value with no rush-hour restriction.
    pub fn all(options: &FilterOptions) -> Self {
        FilterSelection {
            cities: options.cities.iter().cloned().collect(),
            vehicle_types: options.vehicle_types.iter().cloned().collect(),
            weather_conditions: options.weather_conditions.iter().cloned().collect(),
            peak: PeakFilter::All,
        }
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        self.cities.contains(&record.city)
            && self.vehicle_types.contains(&record.vehicle_type)
            && self.weather_conditions.contains(&record.weather_condition)
            && self.peak.matches(record.peak_hour)
    }

    /// Selected values that do not occur in `options`, as `(dimension, value)`.
    pub fn unknown_values<'a>(&'a self, options: &FilterOptions) -> Vec<(&'static str, &'a str)> {
        let dimensions = [
            ("city", &self.cities, &options.cities),
            ("vehicle_type", &self.vehicle_types, &options.vehicle_types),
            (
                "weather_condition",
                &self.weather_conditions,
                &options.weather_conditions,
            ),
        ];

        dimensions
            .into_iter()
            .flat_map(|(name, selected, known)| {
                selected
                    .iter()
                    .filter(|value| !known.contains(value))
                    .map(move |value| (name, value.as_str()))
            })
            .collect()
    }
}

/// Filtered view plus the metrics and chart series the dashboard displays.
#[derive(Debug, Clone)]
pub struct QueryResult<'a> {
    pub total_records: usize,
    pub filtered_records: Vec<&'a EnrichedRecord>,
    pub average_speed: Option<f64>,
    pub average_congestion: Option<f64>,
    pub peak_record_count: usize,
    pub incident_count: usize,
    pub vehicle_type_counts: BTreeMap<String, usize>,
    /// Mean congestion per weather condition; conditions without any
    /// congestion reading are left out.
    pub congestion_by_weather: BTreeMap<String, f64>,
    /// `(record_id, speed)` in filtered order.
    pub speed_series: Vec<(u64, f64)>,
    pub speed_category_counts: BTreeMap<SpeedCategory, usize>,
}

/// Serializable snapshot of a [`QueryResult`] without the row view.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub filtered_records: usize,
    pub average_speed: Option<f64>,
    pub average_congestion: Option<f64>,
    pub peak_record_count: usize,
    pub incident_count: usize,
    pub vehicle_type_counts: BTreeMap<String, usize>,
    pub congestion_by_weather: BTreeMap<String, f64>,
    pub speed_category_counts: BTreeMap<SpeedCategory, usize>,
}

impl QueryResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.filtered_records.is_empty()
    }

    pub fn summary(&self) -> QuerySummary {
        QuerySummary {
            generated_at: Utc::now(),
            total_records: self.total_records,
            filtered_records: self.filtered_records.len(),
            average_speed: self.average_speed,
            average_congestion: self.average_congestion,
            peak_record_count: self.peak_record_count,
            incident_count: self.incident_count,
            vehicle_type_counts: self.vehicle_type_counts.clone(),
            congestion_by_weather: self.congestion_by_weather.clone(),
            speed_category_counts: self.speed_category_counts.clone(),
        }
    }
}

/// Applies `selection` to `records` and aggregates the passing rows.
///
/// An empty result is a valid state: averages are `None`, counts zero and
/// mappings empty.
#[tracing::instrument(skip_all, fields(records = records.len(), peak = %selection.peak))]
pub fn query<'a>(records: &'a [EnrichedRecord], selection: &FilterSelection) -> QueryResult<'a> {
    let filtered_records: Vec<&EnrichedRecord> =
        records.iter().filter(|r| selection.matches(r)).collect();

    let speeds: Vec<f64> = filtered_records.iter().filter_map(|r| r.speed_kmph).collect();
    let congestion: Vec<f64> = filtered_records
        .iter()
        .filter_map(|r| r.congestion_index)
        .collect();

    let result = QueryResult {
        total_records: records.len(),
        average_speed: mean(&speeds),
        average_congestion: mean(&congestion),
        peak_record_count: filtered_records
            .iter()
            .filter(|r| r.peak_hour == PeakHour::Peak)
            .count(),
        incident_count: filtered_records
            .iter()
            .filter(|r| r.incident_type != NO_INCIDENT)
            .count(),
        vehicle_type_counts: tally(filtered_records.iter().map(|r| r.vehicle_type.clone())),
        congestion_by_weather: group_mean(filtered_records.iter().filter_map(|r| {
            r.congestion_index
                .map(|c| (r.weather_condition.clone(), c))
        })),
        speed_series: filtered_records
            .iter()
            .filter_map(|r| r.speed_kmph.map(|s| (r.record_id, s)))
            .collect(),
        speed_category_counts: tally(filtered_records.iter().filter_map(|r| r.speed_category)),
        filtered_records,
    };

    debug!(
        matched = result.filtered_records.len(),
        total = result.total_records,
        "Query evaluated"
    );

    result
}
