//! Error types for aqsense

use thiserror::Error;

/// Main error type for aqsense operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No usable reference data")]
    EmptyInput,

    #[error("Insufficient data: {available} records available, {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("Invalid coordinate: ({latitude}, {longitude}) is not finite or out of range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Station not found in coordinate table: {0}")]
    UnknownStation(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for aqsense operations
pub type Result<T> = std::result::Result<T, Error>;
