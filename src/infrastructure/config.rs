use crate::domain::error::BmsError;
use crate::domain::thresholds::SafetyLimits;
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config/bms";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BmsConfig {
    pub pack: PackConfig,
    pub limits: SafetyLimits,
    pub sampling: SamplingConfig,
    pub sensor: SensorConfig,
    /// Where the monitor state is written after every tick, if anywhere.
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PackConfig {
    pub cell_count: u8,
    pub nominal_capacity_mah: f64,
    pub charge_efficiency: f64,
    pub initial_soc_percent: f64,
    pub soc_full_threshold_percent: f64,
    pub soc_empty_threshold_percent: f64,
    pub degradation_per_cycle_percent: f64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            cell_count: 4,
            nominal_capacity_mah: 3000.0,
            charge_efficiency: 0.98,
            initial_soc_percent: 50.0,
            soc_full_threshold_percent: 98.0,
            soc_empty_threshold_percent: 10.0,
            degradation_per_cycle_percent: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplingConfig {
    pub update_interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SensorConfig {
    Simulated(SimulationConfig),
    Hardware(HardwareConfig),
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig::Simulated(SimulationConfig::default())
    }
}

/// Ranges the simulator draws from. They reach past the safety limits so
/// every tier shows up.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub voltage_min: f64,
    pub voltage_max: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub current_min: f64,
    pub current_max: f64,
    pub fault_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            voltage_min: 2.0,
            voltage_max: 4.6,
            temperature_min: -15.0,
            temperature_max: 65.0,
            current_min: -25.0,
            current_max: 5.0,
            fault_probability: 0.02,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HardwareConfig {
    /// JSON sample file refreshed by the acquisition front-end.
    pub sample_path: PathBuf,
}

impl BmsConfig {
    pub fn validate(&self) -> Result<(), BmsError> {
        let pack = &self.pack;
        let percent = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);

        if pack.cell_count == 0 {
            return Err(BmsError::InvalidConfig("cell_count must be at least 1".to_string()));
        }
        if !pack.nominal_capacity_mah.is_finite() || pack.nominal_capacity_mah <= 0.0 {
            return Err(BmsError::InvalidConfig(
                "nominal_capacity_mah must be positive".to_string(),
            ));
        }
        if !(pack.charge_efficiency > 0.0 && pack.charge_efficiency <= 1.0) {
            return Err(BmsError::InvalidConfig(
                "charge_efficiency must be in (0, 1]".to_string(),
            ));
        }
        if !percent(pack.initial_soc_percent) {
            return Err(BmsError::InvalidConfig(
                "initial_soc_percent must be in [0, 100]".to_string(),
            ));
        }
        if !percent(pack.soc_full_threshold_percent)
            || !percent(pack.soc_empty_threshold_percent)
            || pack.soc_empty_threshold_percent >= pack.soc_full_threshold_percent
        {
            return Err(BmsError::InvalidConfig(
                "SoC thresholds must satisfy 0 <= empty < full <= 100".to_string(),
            ));
        }
        if !percent(pack.degradation_per_cycle_percent) {
            return Err(BmsError::InvalidConfig(
                "degradation_per_cycle_percent must be in [0, 100]".to_string(),
            ));
        }
        if self.sampling.update_interval_ms == 0 {
            return Err(BmsError::InvalidConfig(
                "update_interval_ms must be positive".to_string(),
            ));
        }
        if let SensorConfig::Simulated(sim) = &self.sensor {
            sim.validate()?;
        }

        self.limits.validate()
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), BmsError> {
        let range = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo < hi;
        if !range(self.voltage_min, self.voltage_max)
            || !range(self.temperature_min, self.temperature_max)
            || !range(self.current_min, self.current_max)
        {
            return Err(BmsError::InvalidConfig(
                "simulation ranges must be finite with min < max".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fault_probability) {
            return Err(BmsError::InvalidConfig(
                "fault_probability must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads `config/bms.toml`, or the file named by `BMS_CONFIG`.
pub fn load_bms_config() -> anyhow::Result<BmsConfig> {
    let path = std::env::var("BMS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path))
        .build()
        .with_context(|| format!("Failed to read configuration from {path}"))?;

    finish(settings)
}

/// Parses a TOML document with the same rules as the config file.
#[cfg(test)]
pub fn parse_bms_config(toml: &str) -> anyhow::Result<BmsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(settings)
}

fn finish(settings: config::Config) -> anyhow::Result<BmsConfig> {
    let config: BmsConfig = settings
        .try_deserialize()
        .context("Configuration does not match the expected layout")?;
    config.validate()?;
    Ok(config)
}
