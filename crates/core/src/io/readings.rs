//! Daily measurement records from CSV
//!
//! Expected layout: a header row and, per line, a date, a station
//! identifier and a measurement. Columns are located by header name so
//! extra columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One raw measurement of one station on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub date: NaiveDate,
    pub station: String,
    /// `None` when the source cell was empty, non-numeric, non-finite or negative
    pub value: Option<f64>,
}

/// Header names of the columns to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingColumns {
    pub date: String,
    pub station: String,
    pub value: String,
}

impl Default for ReadingColumns {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            station: "City".to_string(),
            value: "PM2.5".to_string(),
        }
    }
}

/// Read measurement records from a CSV source.
///
/// Missing columns and unparsable dates are errors. Unusable measurement
/// cells are kept as `None` so aggregation can exclude them.
pub fn read_readings<R: Read>(reader: R, columns: &ReadingColumns) -> Result<Vec<Reading>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Parse(format!("Column '{}' not found", name)))
    };
    let date_idx = find(&columns.date)?;
    let station_idx = find(&columns.station)?;
    let value_idx = find(&columns.value)?;

    let mut readings = Vec::new();
    let mut missing = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let date_str = record.get(date_idx).unwrap_or("");
        let date = parse_date(date_str)
            .ok_or_else(|| Error::Parse(format!("Invalid date '{}' on line {}", date_str, line)))?;

        let station = record.get(station_idx).unwrap_or("");
        if station.is_empty() {
            return Err(Error::Parse(format!("Empty station identifier on line {}", line)));
        }

        let value = record.get(value_idx).and_then(parse_value);
        if value.is_none() {
            missing += 1;
        }

        readings.push(Reading {
            date,
            station: station.to_string(),
            value,
        });
    }

    debug!("{} readings without a usable measurement", missing);
    Ok(readings)
}

/// Read measurement records from a CSV file.
pub fn read_readings_path<P: AsRef<Path>>(path: P, columns: &ReadingColumns) -> Result<Vec<Reading>> {
    let path = path.as_ref();
    info!("Loading readings from {}", path.display());
    let file = File::open(path)?;
    let readings = read_readings(file, columns)?;
    info!("Loaded {} readings", readings.len());
    Ok(readings)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_value(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
