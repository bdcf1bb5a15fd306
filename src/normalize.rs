//! Text canonicalization and synonym folding for categorical columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Weather spellings folded onto their canonical condition.
///
/// Keys are in canonical (trimmed, title-cased) form; values never appear as
/// keys, so folding is a fixed point.
pub static WEATHER_SYNONYMS: &[(&str, &str)] = &[
    ("Rainy", "Rain"),
    ("Light Rain", "Rain"),
    ("Foggy", "Fog"),
    ("Mist", "Fog"),
    ("Haze", "Fog"),
];

/// Vehicle type spellings folded onto their canonical type.
pub static VEHICLE_SYNONYMS: &[(&str, &str)] = &[
    ("Motorcycle", "Bike"),
    ("Cycle", "Bicycle"),
    ("Lorry", "Truck"),
];

/// Layouts tried, in order, after RFC 3339.
static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Title-cases `value`: a letter following a non-letter (or at the start) is
/// upper-cased, every other letter is lower-cased.
///
/// `"light rain"` becomes `"Light Rain"`, `"off-peak"` becomes `"Off-Peak"`
/// and `"dl01a1234"` becomes `"Dl01A1234"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

/// Trims and title-cases a categorical field.
pub fn canonical_text(value: &str) -> String {
    title_case(value.trim())
}

/// Keeps only ASCII letters and spaces.
pub fn strip_incident(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect()
}

fn fold(table: &[(&str, &str)], value: &str) -> String {
    table
        .iter()
        .find(|(variant, _)| *variant == value)
        .map_or_else(|| value.to_string(), |(_, canonical)| canonical.to_string())
}

/// Folds a canonical weather condition; unknown values pass through.
pub fn fold_weather(value: &str) -> String {
    fold(WEATHER_SYNONYMS, value)
}

/// Folds a canonical vehicle type; unknown values pass through.
pub fn fold_vehicle(value: &str) -> String {
    fold(VEHICLE_SYNONYMS, value)
}

/// Parses a timestamp, keeping the wall-clock time of zoned values.
///
/// A bare date parses as midnight. Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Reads a boolean-like flag such as `1`, `0`, `true`, `no`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
