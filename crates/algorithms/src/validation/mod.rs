//! Accuracy assessment of the interpolator
//!
//! - **Leave-one-out**: predict each station from all the others

mod leave_one_out;

pub use leave_one_out::{leave_one_out, StationResidual, ValidationReport};
