//! Built-in ten-row dataset used when no source is given.
//!
//! Observations are hourly from 2025-01-01 00:00; measurements are fixed so
//! every run over the sample is reproducible.

use crate::record::RawRecord;

const CITIES: [&str; 10] = [
    "Delhi", "Mumbai", "Delhi", "Chennai", "Delhi", "Kolkata", "Mumbai", "Chennai", "Delhi",
    "Kolkata",
];
const CAMERA_IDS: [u32; 10] = [412, 538, 127, 903, 266, 781, 345, 619, 174, 852];
const ROAD_TYPES: [&str; 10] = [
    "Highway",
    "Main Road",
    "Street",
    "Street",
    "Highway",
    "Main Road",
    "Street",
    "Highway",
    "Street",
    "Main Road",
];
const DIRECTIONS: [&str; 10] = [
    "North", "South", "East", "West", "North", "East", "South", "West", "North", "East",
];
const VEHICLE_TYPES: [&str; 10] = [
    "Car", "Bike", "Truck", "Bicycle", "Car", "Truck", "Bike", "Car", "Bicycle", "Truck",
];
const SPEEDS: [f64; 10] = [45.0, 18.0, 62.0, 25.0, 88.0, 33.0, 15.0, 55.0, 12.0, 70.0];
const OCCUPANCY: [f64; 10] = [55.0, 72.0, 40.0, 35.0, 60.0, 80.0, 85.0, 45.0, 30.0, 65.0];
const CONGESTION: [f64; 10] = [65.0, 88.0, 42.0, 30.0, 55.0, 91.0, 77.0, 48.0, 22.0, 73.0];
const DELAYS: [f64; 10] = [8.0, 22.0, 5.0, 4.0, 6.0, 25.0, 19.0, 7.0, 3.0, 12.0];
const WEATHER: [&str; 10] = [
    "Rain", "Fog", "Clear", "Rain", "Fog", "Clear", "Clear", "Rain", "Fog", "Clear",
];
const INCIDENTS: [&str; 10] = [
    "Accident",
    "None",
    "None",
    "Construction",
    "None",
    "Accident",
    "None",
    "None",
    "Construction",
    "None",
];
const FINES: [&str; 10] = ["1", "0", "0", "1", "0", "1", "0", "0", "1", "0"];
const PLATES: [&str; 10] = [
    "DL01A1234",
    "MH02B5678",
    "DL03C1111",
    "TN09X3333",
    "DL07K9876",
    "WB02Q2222",
    "MH09G5555",
    "TN07L4444",
    "DL08M7777",
    "WB01Z8888",
];

pub fn records() -> Vec<RawRecord> {
    (0..CITIES.len())
        .map(|i| RawRecord {
            record_id: i as u64 + 1,
            timestamp: format!("2025-01-01 {i:02}:00:00"),
            city: CITIES[i].to_string(),
            camera_id: Some(CAMERA_IDS[i]),
            road_type: ROAD_TYPES[i].to_string(),
            direction: DIRECTIONS[i].to_string(),
            vehicle_type: VEHICLE_TYPES[i].to_string(),
            speed_kmph: Some(SPEEDS[i]),
            road_occupancy_percent: Some(OCCUPANCY[i]),
            congestion_index: Some(CONGESTION[i]),
            travel_delay_minutes: Some(DELAYS[i]),
            weather_condition: WEATHER[i].to_string(),
            incident_type: INCIDENTS[i].to_string(),
            fine_issued: FINES[i].to_string(),
            license_plate: PLATES[i].to_string(),
        })
        .collect()
}
