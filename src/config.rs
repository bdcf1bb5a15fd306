//! Runtime configuration: filter selection files and logging settings.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::normalize::{canonical_text, fold_vehicle, fold_weather};
use crate::query::{FilterOptions, FilterSelection, PeakFilter};

pub const DEFAULT_LOG_FILE: &str = "logs/mobility_insights.log";

/// A filter selection as written by a user.
///
/// Stored as JSON; every field is optional and a missing dimension selects
/// all known values:
/// ```json
/// {
///   "cities": ["Delhi", "Mumbai"],
///   "vehicle_types": ["Car"],
///   "peak": "Off-Peak"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    pub cities: Option<BTreeSet<String>>,
    pub vehicle_types: Option<BTreeSet<String>>,
    pub weather_conditions: Option<BTreeSet<String>>,
    pub peak: Option<PeakFilter>,
}

impl SelectionConfig {
    /// Loads a selection from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Overlays `other` on `self`; dimensions set in `other` win.
    pub fn merge(self, other: SelectionConfig) -> Self {
        SelectionConfig {
            cities: other.cities.or(self.cities),
            vehicle_types: other.vehicle_types.or(self.vehicle_types),
            weather_conditions: other.weather_conditions.or(self.weather_conditions),
            peak: other.peak.or(self.peak),
        }
    }

    /// Turns the configured values into a [`FilterSelection`].
    ///
    /// Values are canonicalized the same way record fields are, so `"lorry"`
    /// selects `"Truck"`. Missing dimensions select everything in `options`.
    pub fn resolve(self, options: &FilterOptions) -> FilterSelection {
        let all = FilterSelection::all(options);

        FilterSelection {
            cities: canonicalize(self.cities, |v| canonical_text(v)).unwrap_or(all.cities),
            vehicle_types: canonicalize(self.vehicle_types, |v| fold_vehicle(&canonical_text(v)))
                .unwrap_or(all.vehicle_types),
            weather_conditions: canonicalize(self.weather_conditions, |v| {
                fold_weather(&canonical_text(v))
            })
            .unwrap_or(all.weather_conditions),
            peak: self.peak.unwrap_or_default(),
        }
    }
}

fn canonicalize(
    values: Option<BTreeSet<String>>,
    canonical: impl Fn(&str) -> String,
) -> Option<BTreeSet<String>> {
    values.map(|set| set.iter().map(|v| canonical(v.as_str())).collect())
}

/// Where the JSON log file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub file_name: OsString,
}

impl LogConfig {
    /// Reads `LOG_FILE_PATH`, falling back to [`DEFAULT_LOG_FILE`].
    pub fn from_env() -> Self {
        let path = std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> Self {
        let path = Path::new(path);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("logs"))
            .to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("mobility_insights.log"));

        Self {
            directory,
            file_name,
        }
    }
}
