//! Leave-one-out cross-validation
//!
//! Each station is withheld in turn, an engine is built from the remaining
//! stations, and the withheld value is predicted at its own coordinate.

use serde::Serialize;
use tracing::info;

use aqsense_core::{Error, ReferenceSet, Result};

use crate::interpolation::{Engine, EngineParams};
use crate::maybe_rayon::*;

/// Prediction error at one withheld station
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResidual {
    /// Position in the reference set
    pub index: usize,
    pub name: Option<String>,
    pub observed: f64,
    pub predicted: f64,
    /// `predicted - observed`
    pub error: f64,
    /// Whether observed and predicted values fall in the same band
    pub band_match: bool,
}

/// Summary of a leave-one-out run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub residuals: Vec<StationResidual>,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Fraction of stations whose predicted band equals the observed band
    pub band_agreement: f64,
}

/// Run leave-one-out cross-validation.
///
/// Requires at least two stations.
pub fn leave_one_out(reference: &ReferenceSet, params: &EngineParams) -> Result<ValidationReport> {
    let n = reference.len();
    if n < 2 {
        return Err(Error::InsufficientData {
            available: n,
            required: 2,
        });
    }
    params.validate()?;

    let residuals: Vec<StationResidual> = (0..n)
        .into_par_iter()
        .map(|i| -> Result<StationResidual> {
            let held_out = &reference.records()[i];
            let engine = Engine::with_params(reference.without(i)?, params.clone())?;
            let predicted = engine.predict(held_out.coordinate)?.value;
            Ok(StationResidual {
                index: i,
                name: held_out.name.clone(),
                observed: held_out.value,
                predicted,
                error: predicted - held_out.value,
                band_match: engine.classify(predicted) == engine.classify(held_out.value),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let count = n as f64;
    let mae = residuals.iter().map(|r| r.error.abs()).sum::<f64>() / count;
    let rmse = (residuals.iter().map(|r| r.error * r.error).sum::<f64>() / count).sqrt();
    let band_agreement = residuals.iter().filter(|r| r.band_match).count() as f64 / count;

    info!(
        "Leave-one-out over {} stations: MAE={:.3}, RMSE={:.3}, band agreement={:.1}%",
        n,
        mae,
        rmse,
        100.0 * band_agreement
    );

    Ok(ValidationReport {
        residuals,
        mae,
        rmse,
        band_agreement,
    })
}
