//! Measurement stations and the reference set built from them

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite (no NaN or infinity).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Returns the coordinate unchanged, or `InvalidCoordinate` if it is not finite.
    pub fn validate(self) -> Result<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(Error::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Squared planar distance, treating (latitude, longitude) as (x, y)
    #[inline]
    pub fn dist_sq(&self, other: &Coordinate) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        dlat * dlat + dlon * dlon
    }

    /// Planar Euclidean distance in degrees.
    ///
    /// This is not a geodesic distance. Station spacing is coarse relative
    /// to the distortion, so the approximation is accepted.
    #[inline]
    pub fn dist(&self, other: &Coordinate) -> f64 {
        self.dist_sq(other).sqrt()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// A station with a fixed coordinate and a single scalar measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub coordinate: Coordinate,
    pub value: f64,
    /// Display label; never used in computation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl StationRecord {
    pub fn new(coordinate: impl Into<Coordinate>, value: f64) -> Self {
        Self {
            coordinate: coordinate.into(),
            value,
            name: None,
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if present, otherwise the formatted coordinate.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.coordinate.to_string(),
        }
    }
}

/// Immutable, ordered set of station records.
///
/// Order is significant: when two stations are equally far from a query,
/// the one that appears first wins.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    records: Vec<StationRecord>,
}

impl ReferenceSet {
    /// Build a reference set from cleaned records.
    ///
    /// Duplicate coordinates are accepted; deduplication belongs to data
    /// preparation.
    pub fn build(records: impl IntoIterator<Item = StationRecord>) -> Result<Self> {
        let records: Vec<StationRecord> = records.into_iter().collect();
        if records.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&StationRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StationRecord> {
        self.records.iter()
    }

    /// Minimum and maximum station value.
    pub fn value_range(&self) -> (f64, f64) {
        self.records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.value), hi.max(r.value))
            })
    }

    /// A new set with the record at `index` removed.
    ///
    /// Used for leave-one-out evaluation. Fails with `EmptyInput` when
    /// nothing would remain.
    pub fn without(&self, index: usize) -> Result<Self> {
        let records = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r.clone());
        Self::build(records)
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a StationRecord;
    type IntoIter = std::slice::Iter<'a, StationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
