//! k-nearest Inverse Distance Weighting (IDW)
//!
//! Estimates the value at an unsampled location as a weighted average of the
//! k closest stations, where weights are inversely proportional to distance
//! raised to a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use aqsense_core::{Coordinate, Error, ReferenceSet, Result};

use super::{DistanceMetric, KdTree};
use crate::classification::{Band, BandThresholds};
use crate::maybe_rayon::*;

/// Parameters for the IDW engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Number of nearest stations to combine (default: 3).
    /// Clamped per query to the size of the reference set.
    pub k: usize,
    /// Power parameter (default: 1.0, i.e. w = 1/d).
    /// Higher values give more weight to nearby stations.
    pub power: f64,
    /// Distance metric (default: planar)
    pub metric: DistanceMetric,
    /// Band thresholds used to classify estimates
    pub bands: BandThresholds,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            k: 3,
            power: 1.0,
            metric: DistanceMetric::default(),
            bands: BandThresholds::default(),
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                value: "0".into(),
                reason: "at least one neighbor is required".into(),
            });
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::InvalidParameter {
                name: "power",
                value: self.power.to_string(),
                reason: "must be finite and positive".into(),
            });
        }
        self.bands.validate()
    }
}

/// Interpolated value and its band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub value: f64,
    pub band: Band,
}

/// A selected station and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Position in the reference set
    pub index: usize,
    /// Distance in the unit of the engine's metric
    pub distance: f64,
    pub value: f64,
}

/// A neighbor with its normalized weight (weights of a prediction sum to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub neighbor: Neighbor,
    pub weight: f64,
}

/// Estimate together with the stations that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub estimate: Estimate,
    pub contributions: Vec<Contribution>,
    /// True when the query coincides with a station
    pub exact_match: bool,
}

/// Immutable IDW interpolator over a reference set.
///
/// Holds no mutable state, so one engine can serve any number of queries,
/// concurrently if needed.
#[derive(Debug)]
pub struct Engine {
    reference: ReferenceSet,
    params: EngineParams,
    /// Present for the planar metric only; haversine queries scan linearly
    index: Option<KdTree>,
}

impl Engine {
    /// Build an engine using `k` neighbors and default parameters otherwise.
    pub fn new(reference: ReferenceSet, k: usize) -> Result<Self> {
        Self::with_params(
            reference,
            EngineParams {
                k,
                ..Default::default()
            },
        )
    }

    /// Build an engine with explicit parameters.
    ///
    /// A `k` larger than the reference set is accepted; every query then
    /// uses all stations.
    pub fn with_params(reference: ReferenceSet, params: EngineParams) -> Result<Self> {
        if reference.is_empty() {
            return Err(Error::InsufficientData {
                available: 0,
                required: 1,
            });
        }
        params.validate()?;
        for record in reference.iter() {
            record.coordinate.validate()?;
        }

        let index = match params.metric {
            DistanceMetric::Planar => {
                let coords: Vec<Coordinate> = reference.iter().map(|r| r.coordinate).collect();
                Some(KdTree::build(&coords))
            }
            DistanceMetric::Haversine => None,
        };

        if reference.len() < params.k {
            debug!(
                "k={} exceeds {} stations; queries will use all stations",
                params.k,
                reference.len()
            );
        }
        debug!(
            "Built IDW engine: {} stations, k={}, power={}, metric={:?}",
            reference.len(),
            params.k,
            params.power,
            params.metric
        );

        Ok(Self {
            reference,
            params,
            index,
        })
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Neighbors used per query: `min(k, reference size)`
    pub fn effective_k(&self) -> usize {
        self.params.k.min(self.reference.len())
    }

    /// The `effective_k()` nearest stations, closest first.
    ///
    /// Equally distant stations are ordered by their position in the
    /// reference set.
    pub fn neighbors(&self, query: Coordinate) -> Result<Vec<Neighbor>> {
        let query = query.validate()?;
        let k = self.effective_k();
        let records = self.reference.records();

        let neighbors: Vec<Neighbor> = match &self.index {
            Some(tree) => tree
                .k_nearest(&query, k)
                .into_iter()
                .map(|r| Neighbor {
                    index: r.index,
                    distance: r.distance_sq.sqrt(),
                    value: records[r.index].value,
                })
                .collect(),
            None => {
                let mut all: Vec<Neighbor> = records
                    .iter()
                    .enumerate()
                    .map(|(index, r)| Neighbor {
                        index,
                        distance: self.params.metric.distance(&query, &r.coordinate),
                        value: r.value,
                    })
                    .collect();
                // Stable sort keeps reference order among ties
                all.sort_by(|a, b| a.distance.total_cmp(&b.distance));
                all.truncate(k);
                all
            }
        };

        Ok(neighbors)
    }

    /// Estimate the value at `query` and classify it.
    ///
    /// # Algorithm
    ///
    /// ```text
    /// z(q) = Σ(wi * zi) / Σ(wi)
    /// where wi = 1 / d(q, i)^p over the k nearest stations
    /// ```
    ///
    /// If the nearest station lies exactly on the query, its value is
    /// returned unchanged.
    ///
    /// # Errors
    /// `InvalidCoordinate` if latitude or longitude is NaN or infinite, or so
    /// large that distances overflow.
    pub fn predict(&self, query: Coordinate) -> Result<Estimate> {
        self.predict_detailed(query).map(|p| p.estimate)
    }

    /// Like [`Engine::predict`], also returning the neighbors and their weights.
    pub fn predict_detailed(&self, query: Coordinate) -> Result<Prediction> {
        let neighbors = self.neighbors(query)?;
        // effective_k() >= 1 because the reference set is never empty
        let nearest = neighbors[0];

        if nearest.distance == 0.0 {
            let contributions = neighbors
                .iter()
                .enumerate()
                .map(|(i, &neighbor)| Contribution {
                    neighbor,
                    weight: if i == 0 { 1.0 } else { 0.0 },
                })
                .collect();
            return Ok(Prediction {
                estimate: self.estimate(nearest.value),
                contributions,
                exact_match: true,
            });
        }

        // Weights relative to the nearest distance: (d_min / d_i)^p has the
        // same ratios as 1 / d_i^p and stays in (0, 1] for tiny distances.
        let power = self.params.power;
        let raw: Vec<f64> = neighbors
            .iter()
            .map(|n| (nearest.distance / n.distance).powf(power))
            .collect();

        let sum_w: f64 = raw.iter().sum();
        // Distances overflow for queries far outside any real coordinate range
        if !sum_w.is_finite() || sum_w <= 0.0 {
            return Err(Error::InvalidCoordinate {
                latitude: query.latitude,
                longitude: query.longitude,
            });
        }
        let sum_wz: f64 = raw.iter().zip(&neighbors).map(|(w, n)| w * n.value).sum();

        let (lo, hi) = neighbors
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
                (lo.min(n.value), hi.max(n.value))
            });
        // Rounding must not push the mean outside the neighbor range
        let value = (sum_wz / sum_w).max(lo).min(hi);

        let contributions = neighbors
            .iter()
            .zip(&raw)
            .map(|(&neighbor, &w)| Contribution {
                neighbor,
                weight: w / sum_w,
            })
            .collect();

        Ok(Prediction {
            estimate: self.estimate(value),
            contributions,
            exact_match: false,
        })
    }

    /// Predict many queries. Results keep input order; a bad query only
    /// fails its own slot.
    pub fn predict_batch(&self, queries: &[Coordinate]) -> Vec<Result<Estimate>> {
        queries.par_iter().map(|q| self.predict(*q)).collect()
    }

    /// Classify a value with this engine's thresholds.
    pub fn classify(&self, value: f64) -> Band {
        self.params.bands.classify(value)
    }

    fn estimate(&self, value: f64) -> Estimate {
        Estimate {
            value,
            band: self.classify(value),
        }
    }
}
