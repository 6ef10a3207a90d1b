//! Severity bands for PM2.5 concentrations

use serde::{Deserialize, Serialize};

use aqsense_core::{Error, Result};

/// Discrete severity category of an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Good,
    Moderate,
    Poor,
    Hazardous,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Good, Band::Moderate, Band::Poor, Band::Hazardous];

    pub fn label(&self) -> &'static str {
        match self {
            Band::Good => "Good",
            Band::Moderate => "Moderate",
            Band::Poor => "Poor",
            Band::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bounds (inclusive) of the first three bands.
///
/// Defaults are 50 / 100 / 200 µg/m³. These are policy, not derived
/// values, and can be replaced from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub good_max: f64,
    pub moderate_max: f64,
    pub poor_max: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            good_max: 50.0,
            moderate_max: 100.0,
            poor_max: 200.0,
        }
    }
}

impl BandThresholds {
    /// Thresholds must be finite and strictly ascending.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("good_max", self.good_max),
            ("moderate_max", self.moderate_max),
            ("poor_max", self.poor_max),
        ];
        for (name, value) in bounds {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "threshold must be finite".into(),
                });
            }
        }
        for pair in bounds.windows(2) {
            let (_, lo) = pair[0];
            let (name, hi) = pair[1];
            if hi <= lo {
                return Err(Error::InvalidParameter {
                    name,
                    value: hi.to_string(),
                    reason: format!("must be greater than {}", lo),
                });
            }
        }
        Ok(())
    }

    /// Map a value to its band. Each band includes its upper bound.
    pub fn classify(&self, value: f64) -> Band {
        if value <= self.good_max {
            Band::Good
        } else if value <= self.moderate_max {
            Band::Moderate
        } else if value <= self.poor_max {
            Band::Poor
        } else {
            Band::Hazardous
        }
    }
}
