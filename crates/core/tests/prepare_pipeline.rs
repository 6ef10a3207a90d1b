//! Readings CSV through to a reference set.

use aqsense_core::io::{read_readings, read_station_table, ReadingColumns};
use aqsense_core::prepare::{prepare_reference, MissingStationPolicy, PrepareParams};
use aqsense_core::{Coordinate, Error};

const READINGS: &str = "\
City,Date,PM2.5,PM10,AQI
Ahmedabad,2019-12-31,300.0,,
Ahmedabad,2020-01-01,80.0,,
Ahmedabad,2020-01-02,100.0,,
Delhi,2020-01-01,210.0,,
Delhi,2020-01-02,,,
Delhi,2020-01-03,190.0,,
Shillong,2020-02-01,,,
Nowhere,2020-01-01,55.0,,
";

const STATIONS: &str = "\
station,latitude,longitude
Ahmedabad,23.0225,72.5714
Delhi,28.7041,77.1025
Shillong,25.5788,91.8933
";

#[test]
fn readings_to_reference_set() {
    let readings = read_readings(READINGS.as_bytes(), &ReadingColumns::default()).unwrap();
    assert_eq!(readings.len(), 8);

    let table = read_station_table(STATIONS.as_bytes()).unwrap();
    let prepared = prepare_reference(&readings, &table, &PrepareParams::default()).unwrap();
    assert_eq!(prepared.skipped, vec!["Nowhere".to_string()]);
    assert_eq!(prepared.empty, vec!["Shillong".to_string()]);

    let reference = prepared.into_reference_set().unwrap();
    assert_eq!(reference.len(), 2);

    let ahmedabad = reference.get(0).unwrap();
    assert_eq!(ahmedabad.name.as_deref(), Some("Ahmedabad"));
    assert_eq!(ahmedabad.coordinate, Coordinate::new(23.0225, 72.5714));
    assert!((ahmedabad.value - 90.0).abs() < 1e-12);

    let delhi = reference.get(1).unwrap();
    assert!((delhi.value - 200.0).abs() < 1e-12);
}

#[test]
fn strict_policy_rejects_unknown_station() {
    let readings = read_readings(READINGS.as_bytes(), &ReadingColumns::default()).unwrap();
    let table = read_station_table(STATIONS.as_bytes()).unwrap();
    let params = PrepareParams {
        missing_station: MissingStationPolicy::Error,
        ..Default::default()
    };
    let result = prepare_reference(&readings, &table, &params);
    assert!(matches!(result, Err(Error::UnknownStation(name)) if name == "Nowhere"));
}

#[test]
fn year_without_data_is_empty_input() {
    let readings = read_readings(READINGS.as_bytes(), &ReadingColumns::default()).unwrap();
    let table = read_station_table(STATIONS.as_bytes()).unwrap();
    let params = PrepareParams {
        year: Some(1999),
        ..Default::default()
    };
    let prepared = prepare_reference(&readings, &table, &params).unwrap();
    assert!(matches!(prepared.into_reference_set(), Err(Error::EmptyInput)));
}
