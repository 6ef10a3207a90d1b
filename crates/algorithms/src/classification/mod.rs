//! Classification of interpolated values
//!
//! - **Bands**: GOOD / MODERATE / POOR / HAZARDOUS severity from fixed thresholds

mod band;

pub use band::{Band, BandThresholds};
