//! Record types for traffic camera observations.
//!
//! [`RawRecord`] mirrors one row of the source CSV. [`EnrichedRecord`] is the
//! cleaned row plus the derived columns produced by [`crate::pipeline`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used when an enriched record is written back as raw text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single row as delivered by the data source.
///
/// Measurement columns that do not parse are read as `None` rather than
/// rejecting the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Record_ID")]
    pub record_id: u64,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Camera_ID", default, deserialize_with = "csv::invalid_option")]
    pub camera_id: Option<u32>,
    #[serde(rename = "Road_Type", default)]
    pub road_type: String,
    #[serde(rename = "Direction", default)]
    pub direction: String,
    #[serde(rename = "Vehicle_Type", default)]
    pub vehicle_type: String,
    #[serde(rename = "Speed_KMPH", default, deserialize_with = "csv::invalid_option")]
    pub speed_kmph: Option<f64>,
    #[serde(
        rename = "Road_Occupancy_Percent",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub road_occupancy_percent: Option<f64>,
    #[serde(
        rename = "Congestion_Index",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub congestion_index: Option<f64>,
    #[serde(
        rename = "Travel_Delay_Minutes",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub travel_delay_minutes: Option<f64>,
    #[serde(rename = "Weather_Condition", default)]
    pub weather_condition: String,
    #[serde(rename = "Incident_Type", default)]
    pub incident_type: String,
    #[serde(rename = "Fine_Issued", default)]
    pub fine_issued: String,
    #[serde(rename = "License_Plate", default)]
    pub license_plate: String,
}

/// Rush-hour classification of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeakHour {
    Peak,
    #[serde(rename = "Off-Peak")]
    OffPeak,
}

impl PeakHour {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeakHour::Peak => "Peak",
            PeakHour::OffPeak => "Off-Peak",
        }
    }
}

impl fmt::Display for PeakHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speed band over the (0, 120] km/h domain.
///
/// | Range      | Category  |
/// |------------|-----------|
/// | (0, 20]    | Very Slow |
/// | (20, 40]   | Slow      |
/// | (40, 60]   | Normal    |
/// | (60, 120]  | Fast      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeedCategory {
    #[serde(rename = "Very Slow")]
    VerySlow,
    Slow,
    Normal,
    Fast,
}

impl SpeedCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedCategory::VerySlow => "Very Slow",
            SpeedCategory::Slow => "Slow",
            SpeedCategory::Normal => "Normal",
            SpeedCategory::Fast => "Fast",
        }
    }
}

impl fmt::Display for SpeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaned observation with its derived columns.
///
/// Derived fields are computed once by the pipeline from the source fields
/// of the same record. Source fields serialize under their CSV column names,
/// so an exported table loads back as [`RawRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Record_ID")]
    pub record_id: u64,
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Camera_ID")]
    pub camera_id: Option<u32>,
    #[serde(rename = "Road_Type")]
    pub road_type: String,
    #[serde(rename = "Direction")]
    pub direction: String,
    #[serde(rename = "Vehicle_Type")]
    pub vehicle_type: String,
    #[serde(rename = "Speed_KMPH")]
    pub speed_kmph: Option<f64>,
    #[serde(rename = "Road_Occupancy_Percent")]
    pub road_occupancy_percent: Option<f64>,
    #[serde(rename = "Congestion_Index")]
    pub congestion_index: Option<f64>,
    #[serde(rename = "Travel_Delay_Minutes")]
    pub travel_delay_minutes: Option<f64>,
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: String,
    #[serde(rename = "Incident_Type")]
    pub incident_type: String,
    #[serde(rename = "Fine_Issued")]
    pub fine_issued: Option<bool>,
    #[serde(rename = "License_Plate")]
    pub license_plate: String,

    // derived
    #[serde(rename = "Hour")]
    pub hour: Option<u32>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Peak_Hour")]
    pub peak_hour: PeakHour,
    #[serde(rename = "Speed_Category")]
    pub speed_category: Option<SpeedCategory>,
    #[serde(rename = "Is_Congested")]
    pub is_congested: bool,
    #[serde(rename = "Delay_Factor")]
    pub delay_factor: Option<f64>,
}

impl From<&EnrichedRecord> for RawRecord {
    /// Re-expresses the source fields of an enriched record as a raw row.
    fn from(record: &EnrichedRecord) -> Self {
        RawRecord {
            record_id: record.record_id,
            timestamp: record
                .timestamp
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            city: record.city.clone(),
            camera_id: record.camera_id,
            road_type: record.road_type.clone(),
            direction: record.direction.clone(),
            vehicle_type: record.vehicle_type.clone(),
            speed_kmph: record.speed_kmph,
            road_occupancy_percent: record.road_occupancy_percent,
            congestion_index: record.congestion_index,
            travel_delay_minutes: record.travel_delay_minutes,
            weather_condition: record.weather_condition.clone(),
            incident_type: record.incident_type.clone(),
            fine_issued: match record.fine_issued {
                Some(true) => "1".to_string(),
                Some(false) => "0".to_string(),
                None => String::new(),
            },
            license_plate: record.license_plate.clone(),
        }
    }
}
