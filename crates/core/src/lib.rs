//! # aqsense core
//!
//! Core types and data preparation for the aqsense station interpolator.
//!
//! This crate provides:
//! - `Coordinate`, `StationRecord`: a measurement station and its value
//! - `ReferenceSet`: the immutable set of stations an engine interpolates from
//! - `io`: CSV readers for daily measurement records and the station table
//! - `prepare`: year filtering and per-station aggregation

pub mod error;
pub mod io;
pub mod prepare;
pub mod station;

pub use error::{Error, Result};
pub use station::{Coordinate, ReferenceSet, StationRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::{Reading, ReadingColumns, StationTable};
    pub use crate::prepare::{prepare_reference, MissingStationPolicy, PrepareParams};
    pub use crate::station::{Coordinate, ReferenceSet, StationRecord};
}
