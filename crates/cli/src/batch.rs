//! Batch prediction over a CSV of query coordinates.
//!
//! Input needs `lat` and `lon` columns. Output has one row per input row:
//! `lat,lon,value,band,error`, where `error` is empty on success.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};

use aqsense_algorithms::interpolation::Engine;
use aqsense_core::Coordinate;

/// Counts of a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub failed: usize,
}

pub fn run<R: Read, W: Write>(engine: &Engine, input: R, output: W) -> Result<BatchSummary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("lat") || h.eq_ignore_ascii_case("latitude"))
        .context("Column 'lat' not found")?;
    let lon_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("lon") || h.eq_ignore_ascii_case("longitude"))
        .context("Column 'lon' not found")?;

    // Raw text is kept so rows echo their input even when it does not parse
    let mut raw: Vec<(String, String)> = Vec::new();
    let mut parsed: Vec<Option<Coordinate>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let lat = record.get(lat_idx).unwrap_or("").to_string();
        let lon = record.get(lon_idx).unwrap_or("").to_string();
        parsed.push(match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        });
        raw.push((lat, lon));
    }

    let valid: Vec<Coordinate> = parsed.iter().flatten().copied().collect();
    let mut estimates = engine.predict_batch(&valid).into_iter();

    let mut writer = Writer::from_writer(output);
    writer.write_record(["lat", "lon", "value", "band", "error"])?;

    let mut failed = 0;
    for ((lat, lon), coordinate) in raw.iter().zip(&parsed) {
        let row = match coordinate {
            None => Err("invalid number".to_string()),
            Some(_) => match estimates.next() {
                Some(Ok(estimate)) => Ok(estimate),
                Some(Err(e)) => Err(e.to_string()),
                None => Err("missing result".to_string()),
            },
        };
        match row {
            Ok(estimate) => {
                let value = format!("{:.2}", estimate.value);
                writer.write_record([lat.as_str(), lon.as_str(), value.as_str(), estimate.band.label(), ""])?
            }
            Err(message) => {
                failed += 1;
                writer.write_record([lat.as_str(), lon.as_str(), "", "", message.as_str()])?
            }
        }
    }
    writer.flush()?;

    Ok(BatchSummary {
        rows: raw.len(),
        failed,
    })
}
