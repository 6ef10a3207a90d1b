//! Station identifier to coordinate lookup

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::station::Coordinate;

/// Mapping from station identifier to its coordinate.
///
/// Deserializes from a map of `name = [latitude, longitude]` pairs, which is
/// how it appears in a TOML config file. Non-finite coordinates are
/// rejected on both the TOML and CSV paths.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, (f64, f64)>")]
pub struct StationTable {
    entries: BTreeMap<String, Coordinate>,
}

impl StationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Insert or replace a station, returning the previous coordinate.
    pub fn insert(&mut self, station: impl Into<String>, coordinate: Coordinate) -> Option<Coordinate> {
        self.entries.insert(station.into(), coordinate)
    }

    pub fn get(&self, station: &str) -> Option<Coordinate> {
        self.entries.get(station).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Extend with another table; entries in `other` win.
    pub fn merge(&mut self, other: StationTable) {
        self.entries.extend(other.entries);
    }
}

impl TryFrom<BTreeMap<String, (f64, f64)>> for StationTable {
    type Error = Error;

    fn try_from(map: BTreeMap<String, (f64, f64)>) -> Result<Self> {
        let entries = map
            .into_iter()
            .map(|(k, (lat, lon))| Ok((k, Coordinate::new(lat, lon).validate()?)))
            .collect::<Result<_>>()?;
        Ok(Self { entries })
    }
}

/// Read a station table from CSV with `station,latitude,longitude` headers.
///
/// Non-finite coordinates are rejected.
pub fn read_station_table<R: Read>(reader: R) -> Result<StationTable> {
    #[derive(Deserialize)]
    struct Row {
        station: String,
        latitude: f64,
        longitude: f64,
    }

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = StationTable::new();
    for result in csv_reader.deserialize::<Row>() {
        let row = result?;
        let coordinate = Coordinate::new(row.latitude, row.longitude).validate()?;
        if table.insert(row.station.clone(), coordinate).is_some() {
            return Err(Error::Parse(format!("Duplicate station '{}'", row.station)));
        }
    }
    Ok(table)
}

/// Read a station table from a CSV file.
pub fn read_station_table_path<P: AsRef<Path>>(path: P) -> Result<StationTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_station_table(file)?;
    info!("Loaded {} station coordinates from {}", table.len(), path.display());
    Ok(table)
}
