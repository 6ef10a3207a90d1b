//! Reduce raw readings to one value per located station
//!
//! Readings are filtered to a calendar year, averaged per station, and
//! joined with a [`StationTable`] to attach coordinates.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::io::{Reading, StationTable};
use crate::station::{ReferenceSet, StationRecord};

/// What to do with a station that has data but no known coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStationPolicy {
    /// Drop silently
    Skip,
    /// Drop and log a warning
    #[default]
    Warn,
    /// Fail with `UnknownStation`
    Error,
}

/// Parameters for data preparation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareParams {
    /// Calendar year to keep (default: 2020). `None` keeps every year.
    pub year: Option<i32>,
    /// Handling of stations absent from the coordinate table
    pub missing_station: MissingStationPolicy,
}

impl Default for PrepareParams {
    fn default() -> Self {
        Self {
            year: Some(2020),
            missing_station: MissingStationPolicy::default(),
        }
    }
}

/// Outcome of data preparation
#[derive(Debug, Clone)]
pub struct PreparedStations {
    /// One record per located station, ordered by identifier
    pub records: Vec<StationRecord>,
    /// Stations with data but no coordinate
    pub skipped: Vec<String>,
    /// Stations whose readings in the window were all missing
    pub empty: Vec<String>,
}

impl PreparedStations {
    /// Build the reference set. Fails with `EmptyInput` if no station survived.
    pub fn into_reference_set(self) -> Result<ReferenceSet> {
        ReferenceSet::build(self.records)
    }
}

/// Aggregate readings into station records.
///
/// For every station with readings in the selected year, the mean of the
/// present values becomes the station value. Stations are emitted in
/// identifier order.
pub fn prepare_reference(
    readings: &[Reading],
    table: &StationTable,
    params: &PrepareParams,
) -> Result<PreparedStations> {
    // station -> (sum, count)
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for reading in readings {
        if let Some(year) = params.year {
            if reading.date.year() != year {
                continue;
            }
        }
        let entry = sums.entry(reading.station.as_str()).or_insert((0.0, 0));
        if let Some(v) = reading.value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let mut records = Vec::with_capacity(sums.len());
    let mut skipped = Vec::new();
    let mut empty = Vec::new();

    for (station, (sum, count)) in sums {
        if count == 0 {
            empty.push(station.to_string());
            continue;
        }

        let Some(coordinate) = table.get(station) else {
            match params.missing_station {
                MissingStationPolicy::Skip => {}
                MissingStationPolicy::Warn => {
                    warn!("No coordinate for station '{}', skipping", station)
                }
                MissingStationPolicy::Error => {
                    return Err(Error::UnknownStation(station.to_string()))
                }
            }
            skipped.push(station.to_string());
            continue;
        };

        records.push(StationRecord::new(coordinate, sum / count as f64).with_name(station));
    }

    info!(
        "Prepared {} stations ({} without coordinates, {} without data)",
        records.len(),
        skipped.len(),
        empty.len()
    );

    Ok(PreparedStations {
        records,
        skipped,
        empty,
    })
}
