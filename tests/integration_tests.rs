use mobility_insights::config::SelectionConfig;
use mobility_insights::dashboard::Dashboard;
use mobility_insights::loader::parse_csv;
use mobility_insights::query::{FilterSelection, PeakFilter};
use mobility_insights::record::{PeakHour, RawRecord, SpeedCategory};
use mobility_insights::sample;
use std::collections::BTreeSet;

fn sample_dashboard() -> Dashboard {
    Dashboard::new(&sample::records())
}

fn ids(dashboard: &Dashboard, selection: &FilterSelection) -> Vec<u64> {
    dashboard
        .query(selection)
        .filtered_records
        .iter()
        .map(|r| r.record_id)
        .collect()
}

#[test]
fn test_full_pipeline_over_sample() {
    let dashboard = sample_dashboard();
    let result = dashboard.query(&dashboard.default_selection());

    assert_eq!(result.filtered_records.len(), 10);
    assert_eq!(result.peak_record_count, 2);
    assert_eq!(result.incident_count, 4);
    assert_eq!(result.vehicle_type_counts.get("Car"), Some(&3));
    assert_eq!(result.vehicle_type_counts.get("Truck"), Some(&3));
    assert_eq!(result.vehicle_type_counts.get("Bike"), Some(&2));
    assert_eq!(result.vehicle_type_counts.get("Bicycle"), Some(&2));
    assert_eq!(result.congestion_by_weather.len(), 3);

    // hours 0..=9 on 2025-01-01; only 08:00 and 09:00 are rush hour
    let peak: Vec<u64> = dashboard
        .records()
        .iter()
        .filter(|r| r.peak_hour == PeakHour::Peak)
        .map(|r| r.record_id)
        .collect();
    assert_eq!(peak, vec![9, 10]);
}

#[test]
fn test_city_filter_keeps_original_order() {
    let dashboard = sample_dashboard();
    let mut selection = dashboard.default_selection();
    selection.cities = BTreeSet::from(["Delhi".to_string()]);

    assert_eq!(ids(&dashboard, &selection), vec![1, 3, 5, 9]);
}

#[test]
fn test_empty_city_selection_is_safe() {
    let dashboard = sample_dashboard();
    let mut selection = dashboard.default_selection();
    selection.cities.clear();

    let result = dashboard.query(&selection);
    assert!(result.filtered_records.is_empty());
    assert_eq!(result.average_speed, None);
    assert_eq!(result.average_congestion, None);
    assert!(result.vehicle_type_counts.is_empty());
    assert!(result.congestion_by_weather.is_empty());
}

#[test]
fn test_selection_file_drives_query() {
    let dashboard = sample_dashboard();
    let selection = SelectionConfig::from_json(
        r#"{ "weather_conditions": ["rainy"], "peak": "Off-Peak" }"#,
    )
    .unwrap()
    .resolve(dashboard.options());

    assert_eq!(selection.peak, PeakFilter::OffPeak);
    assert_eq!(ids(&dashboard, &selection), vec![1, 4, 8]);
}

#[test]
fn test_messy_csv_is_cleaned_end_to_end() {
    let csv = "\
Record_ID,Timestamp,City,Vehicle_Type,Speed_KMPH,Congestion_Index,Travel_Delay_Minutes,Weather_Condition,Incident_Type,License_Plate
1,2025-03-03 18:10:00,  delhi ,MOTORCYCLE,19,50,4,light rain,accident!!,dl01a1234
2,sometime,Delhi,lorry,130,90,9,Haze,none,mh02b5678
3,2025-03-03 07:59:00,DELHI,car,41,70,2,rainy,None,tn09x3333
";
    let raw = parse_csv(csv.as_bytes()).unwrap();
    let dashboard = Dashboard::new(&raw);
    let records = dashboard.records();

    assert_eq!(dashboard.options().cities, vec!["Delhi"]);
    assert_eq!(dashboard.options().vehicle_types, vec!["Bike", "Truck", "Car"]);
    assert_eq!(dashboard.options().weather_conditions, vec!["Rain", "Fog"]);

    assert_eq!(records[0].incident_type, "Accident");
    assert_eq!(records[0].license_plate, "DL01A1234");
    assert_eq!(records[0].peak_hour, PeakHour::Peak);
    assert_eq!(records[0].speed_category, Some(SpeedCategory::VerySlow));
    assert_eq!(records[0].day.as_deref(), Some("Monday"));
    assert_eq!(records[0].month.as_deref(), Some("March"));

    assert_eq!(records[1].hour, None);
    assert_eq!(records[1].peak_hour, PeakHour::OffPeak);
    assert_eq!(records[1].speed_category, None);
    assert!(records[1].is_congested);
    assert_eq!(dashboard.issues().len(), 2);

    assert_eq!(records[2].peak_hour, PeakHour::OffPeak);
    assert_eq!(records[2].speed_category, Some(SpeedCategory::Normal));
    assert!(records[2].is_congested);

    let mut selection = dashboard.default_selection();
    selection.weather_conditions = BTreeSet::from(["Rain".to_string()]);
    let result = dashboard.query(&selection);
    assert_eq!(result.congestion_by_weather.get("Rain"), Some(&60.0));
    assert_eq!(result.incident_count, 1);
}

#[test]
fn test_sample_round_trips_through_csv() {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in sample::records() {
        writer.serialize(&row).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let parsed: Vec<RawRecord> = parse_csv(&bytes).unwrap();
    assert_eq!(parsed, sample::records());
}

#[test]
fn test_non_finite_measurements_do_not_poison_averages() {
    let csv = "\
Record_ID,Timestamp,City,Vehicle_Type,Speed_KMPH,Congestion_Index,Weather_Condition,Incident_Type
1,2025-01-01 08:00:00,Delhi,Car,40,50,Rain,None
2,2025-01-01 09:00:00,Delhi,Car,nan,NaN,Rain,None
3,2025-01-01 10:00:00,Delhi,Car,inf,90,Rain,None
";
    let raw = parse_csv(csv.as_bytes()).unwrap();
    assert_eq!(raw.len(), 3);

    let dashboard = Dashboard::new(&raw);
    let result = dashboard.query(&dashboard.default_selection());

    assert_eq!(result.average_speed, Some(40.0));
    assert_eq!(result.average_congestion, Some(70.0));
    assert_eq!(result.congestion_by_weather.get("Rain"), Some(&70.0));
    assert_eq!(result.speed_series, vec![(1, 40.0)]);
    assert_eq!(dashboard.records()[2].speed_category, None);
    assert_eq!(dashboard.issues().len(), 3);
}
