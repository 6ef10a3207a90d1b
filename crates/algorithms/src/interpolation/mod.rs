//! Spatial interpolation from scattered stations
//!
//! - IDW: k-nearest inverse distance weighting with severity bands
//! - k-d tree: nearest-neighbor index for planar queries
//! - Distance metrics: planar (default) and haversine

mod distance;
mod idw;
pub mod kdtree;

pub use distance::{DistanceMetric, EARTH_RADIUS_KM};
pub use idw::{Contribution, Engine, EngineParams, Estimate, Neighbor, Prediction};
pub use kdtree::{KdTree, NearestResult};
