//! # aqsense algorithms
//!
//! Interpolation and classification for station measurements.
//!
//! ## Available Algorithm Categories
//!
//! - **interpolation**: k-nearest IDW engine, k-d tree, distance metrics
//! - **classification**: severity bands
//! - **validation**: leave-one-out cross-validation

pub mod classification;
pub mod interpolation;
pub mod validation;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{Band, BandThresholds};
    pub use crate::interpolation::{
        DistanceMetric, Engine, EngineParams, Estimate, Neighbor, Prediction,
    };
    pub use crate::validation::{leave_one_out, ValidationReport};
    pub use aqsense_core::prelude::*;
}
