use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use aqsense_algorithms::classification::BandThresholds;
use aqsense_algorithms::interpolation::{DistanceMetric, EngineParams};
use aqsense_core::io::{ReadingColumns, StationTable};
use aqsense_core::prepare::PrepareParams;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub bands: BandThresholds,
    pub data: DataConfig,
    /// Station identifier -> [latitude, longitude]
    pub stations: StationTable,
    pub presets: Vec<Preset>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub k: usize,
    pub power: f64,
    pub metric: DistanceMetric,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// CSV of daily readings
    pub readings: Option<PathBuf>,
    /// Optional CSV (`station,latitude,longitude`) merged over `[stations]`
    pub station_table: Option<PathBuf>,
    pub columns: ReadingColumns,
    #[serde(flatten)]
    pub prepare: PrepareParams,
}

/// A named demo location offered by the interactive prompt
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            bands: BandThresholds::default(),
            data: DataConfig::default(),
            stations: StationTable::default(),
            presets: vec![Preset {
                name: "New Delhi Suburbs".to_string(),
                lat: 28.55,
                lon: 77.15,
            }],
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            readings: Some(PathBuf::from("data/city_day.csv")),
            station_table: None,
            columns: ReadingColumns::default(),
            prepare: PrepareParams::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            k: params.k,
            power: params.power,
            metric: params.metric,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&content)?;

        // Data paths are relative to the config file
        if let Some(dir) = path.parent() {
            config.data.readings = config.data.readings.map(|p| dir.join(p));
            config.data.station_table = config.data.station_table.map(|p| dir.join(p));
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            k: self.engine.k,
            power: self.engine.power,
            metric: self.engine.metric,
            bands: self.bands,
        }
    }
}
