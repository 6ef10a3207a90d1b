//! Distance metrics between station coordinates

use aqsense_core::Coordinate;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Distance used to rank and weight neighbors.
///
/// `Planar` treats (latitude, longitude) as a flat plane and measures in
/// degrees. It distorts east-west distances away from the equator; the
/// error is small next to typical station spacing. `Haversine` measures
/// great-circle kilometres for callers that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Planar,
    Haversine,
}

impl DistanceMetric {
    pub fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => a.dist(b),
            DistanceMetric::Haversine => haversine(a, b),
        }
    }

    /// Unit of the values returned by [`DistanceMetric::distance`]
    pub fn unit(&self) -> &'static str {
        match self {
            DistanceMetric::Planar => "deg",
            DistanceMetric::Haversine => "km",
        }
    }
}

fn haversine(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let dphi = (b.latitude - a.latitude).to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar() {
        let d = DistanceMetric::Planar.distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_zero() {
        let c = Coordinate::new(28.7041, 77.1025);
        assert_eq!(DistanceMetric::Haversine.distance(&c, &c), 0.0);
    }

    #[test]
    fn test_haversine_delhi_mumbai() {
        let delhi = Coordinate::new(28.7041, 77.1025);
        let mumbai = Coordinate::new(19.0760, 72.8777);
        let d = DistanceMetric::Haversine.distance(&delhi, &mumbai);
        // Roughly 1150 km
        assert!((d - 1150.0).abs() < 20.0, "got {}", d);
    }

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let d = DistanceMetric::Haversine.distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 1.0));
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }
}
