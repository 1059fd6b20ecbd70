// Simulated sensor backend with random fault injection
use crate::application::sensor_source::SensorSource;
use crate::domain::cell::{CellReading, PackSnapshot};
use crate::domain::thresholds::SafetyLimits;
use crate::infrastructure::config::SimulationConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SimulatedSensor {
    cell_count: u8,
    settings: SimulationConfig,
    limits: SafetyLimits,
    rng: StdRng,
}

impl SimulatedSensor {
    pub fn new(cell_count: u8, settings: SimulationConfig, limits: SafetyLimits) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            cell_count,
            settings,
            limits,
            rng,
        }
    }

    fn inject_fault(&mut self) -> bool {
        self.rng.random::<f64>() < self.settings.fault_probability
    }

    fn read_voltage(&mut self, cell_id: u8) -> f64 {
        let voltage = self
            .rng
            .random_range(self.settings.voltage_min..=self.settings.voltage_max);
        if !self.inject_fault() {
            return voltage;
        }

        let limits = self.limits.voltage;
        let kind: f64 = self.rng.random();
        let jitter: f64 = self.rng.random();
        if kind < 0.33 {
            tracing::warn!("[SIM] Cell {} - low voltage fault injected", cell_id);
            limits.low_critical - jitter * 0.2
        } else if kind < 0.66 {
            tracing::warn!("[SIM] Cell {} - high voltage fault injected", cell_id);
            limits.high_critical + jitter * 0.2
        } else {
            tracing::warn!(
                "[SIM] Cell {} - extreme voltage fault injected (sensor error)",
                cell_id
            );
            if jitter < 0.5 {
                limits.low_fault - 0.1
            } else {
                limits.high_fault + 0.1
            }
        }
    }

    fn read_temperature(&mut self, cell_id: u8) -> f64 {
        let temperature = self
            .rng
            .random_range(self.settings.temperature_min..=self.settings.temperature_max);
        if !self.inject_fault() {
            return temperature;
        }

        let limits = self.limits.temperature;
        let kind: f64 = self.rng.random();
        let jitter: f64 = self.rng.random();
        if kind < 0.33 {
            tracing::warn!("[SIM] Cell {} - low temperature fault injected", cell_id);
            limits.low_critical - jitter * 5.0
        } else if kind < 0.66 {
            tracing::warn!("[SIM] Cell {} - high temperature fault injected", cell_id);
            limits.high_critical + jitter * 5.0
        } else {
            tracing::warn!(
                "[SIM] Cell {} - extreme temperature fault injected (sensor error)",
                cell_id
            );
            if jitter < 0.5 {
                limits.low_fault - 1.0
            } else {
                limits.high_fault + 1.0
            }
        }
    }

    fn read_current(&mut self) -> f64 {
        let current = self
            .rng
            .random_range(self.settings.current_min..=self.settings.current_max);
        if !self.inject_fault() {
            return current;
        }

        let limits = self.limits.current;
        let kind: f64 = self.rng.random();
        let jitter: f64 = self.rng.random();
        if kind < 0.33 {
            tracing::warn!("[SIM] Pack - high discharge current injected");
            -(limits.discharge_critical + jitter * 5.0)
        } else if kind < 0.66 {
            tracing::warn!("[SIM] Pack - high charge current injected");
            limits.charge_critical + jitter
        } else {
            tracing::warn!("[SIM] Pack - extreme current injected (sensor error)");
            if jitter < 0.5 { -50.0 } else { 10.0 }
        }
    }
}

#[async_trait]
impl SensorSource for SimulatedSensor {
    async fn read_snapshot(&mut self) -> anyhow::Result<PackSnapshot> {
        let cells = (0..self.cell_count)
            .map(|id| {
                let voltage = self.read_voltage(id);
                let temperature = self.read_temperature(id);
                CellReading::new(id, voltage, temperature)
            })
            .collect();
        let current = self.read_current();

        Ok(PackSnapshot::new(cells, current))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
