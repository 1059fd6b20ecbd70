// Battery monitor - Runs one evaluation tick over a pack snapshot
use crate::application::event_sink::EventSink;
use crate::application::severity_resolver::{describe_faults, resolve};
use crate::application::transition_policy::next_state;
use crate::domain::cell::PackSnapshot;
use crate::domain::charge::{ChargeEstimator, ChargeState};
use crate::domain::error::BmsError;
use crate::domain::health::{HealthEstimator, HealthState};
use crate::domain::system_state::SystemState;
use crate::domain::thresholds::{CurrentDirection, SafetyLimits};
use crate::infrastructure::config::BmsConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a host observes after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub state: SystemState,
    pub proposal: SystemState,
    pub state_of_charge_percent: f64,
    pub state_of_health_percent: f64,
    pub is_charging: bool,
    pub transitioned: bool,
}

/// What a host needs to write down to survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub accumulated_charge_mah: f64,
    pub charge_cycles: f64,
    pub state_of_health_percent: f64,
    pub system_state: SystemState,
    #[serde(default)]
    pub was_full: bool,
    #[serde(default)]
    pub was_empty: bool,
    pub saved_at: DateTime<Utc>,
}

/// Owns the charge, health and safety state of one pack.
///
/// Ticks must be serialized by the host; `tick` takes `&mut self` so a
/// shared monitor has to sit behind a lock.
pub struct BatteryMonitor {
    cell_count: usize,
    limits: SafetyLimits,
    charge_estimator: ChargeEstimator,
    health_estimator: HealthEstimator,
    charge: ChargeState,
    health: HealthState,
    state: SystemState,
    pack_current: f64,
    is_charging: bool,
    sink: Arc<dyn EventSink>,
}

impl BatteryMonitor {
    pub fn new(config: &BmsConfig, sink: Arc<dyn EventSink>) -> Result<Self, BmsError> {
        config.validate()?;

        let pack = &config.pack;
        let charge_estimator = ChargeEstimator::new(
            pack.nominal_capacity_mah,
            pack.charge_efficiency,
            config.limits.current,
        );
        let health_estimator = HealthEstimator::new(
            pack.soc_full_threshold_percent,
            pack.soc_empty_threshold_percent,
            pack.degradation_per_cycle_percent,
        );
        let charge = ChargeState::at_percent(pack.nominal_capacity_mah, pack.initial_soc_percent);

        Ok(Self {
            cell_count: pack.cell_count as usize,
            limits: config.limits,
            health: health_estimator.health_for(charge.charge_cycles),
            charge_estimator,
            health_estimator,
            charge,
            state: SystemState::Normal,
            pack_current: 0.0,
            is_charging: false,
            sink,
        })
    }

    /// Rebuilds a monitor from a previously persisted state.
    ///
    /// SoC is recomputed from the accumulated charge and SoH from the cycle
    /// count, so only those two and the system state are authoritative.
    pub fn restore(
        config: &BmsConfig,
        sink: Arc<dyn EventSink>,
        persisted: &PersistedState,
    ) -> Result<Self, BmsError> {
        let mut monitor = Self::new(config, sink)?;
        let capacity = monitor.charge_estimator.nominal_capacity_mah();

        if !persisted.accumulated_charge_mah.is_finite()
            || !(0.0..=capacity).contains(&persisted.accumulated_charge_mah)
        {
            return Err(BmsError::InvalidPersistedState(format!(
                "accumulated charge {} mAh outside [0, {capacity}]",
                persisted.accumulated_charge_mah
            )));
        }
        if !persisted.charge_cycles.is_finite() || persisted.charge_cycles < 0.0 {
            return Err(BmsError::InvalidPersistedState(format!(
                "charge cycle count {} is not a non-negative number",
                persisted.charge_cycles
            )));
        }

        monitor.charge.accumulated_charge = persisted.accumulated_charge_mah;
        monitor.charge.charge_cycles = persisted.charge_cycles;
        monitor.charge.was_full = persisted.was_full;
        monitor.charge.was_empty = persisted.was_empty;
        monitor.charge_estimator.refresh_percent(&mut monitor.charge);
        monitor.health = monitor.health_estimator.health_for(persisted.charge_cycles);
        monitor.state = persisted.system_state;

        let soh_drift =
            monitor.health.state_of_health_percent - persisted.state_of_health_percent;
        if soh_drift.abs() > 1e-6 {
            tracing::warn!(
                "Persisted SoH {:.2}% disagrees with cycle count, using {:.2}%",
                persisted.state_of_health_percent,
                monitor.health.state_of_health_percent
            );
        }

        Ok(monitor)
    }

    /// Runs charge estimation, health estimation, severity resolution and the
    /// transition policy, in that order, for one sampling tick.
    ///
    /// A malformed snapshot or elapsed time is rejected before any state changes.
    pub fn tick(
        &mut self,
        snapshot: &PackSnapshot,
        elapsed_s: f64,
    ) -> Result<TickOutcome, BmsError> {
        if !elapsed_s.is_finite() || elapsed_s < 0.0 {
            return Err(BmsError::InvalidElapsed(elapsed_s));
        }
        snapshot.validate(self.cell_count)?;

        self.pack_current = snapshot.current;
        match self.limits.current.direction(snapshot.current) {
            CurrentDirection::Charging => self.is_charging = true,
            CurrentDirection::Discharging => self.is_charging = false,
            CurrentDirection::Idle => {}
        }

        self.charge_estimator
            .integrate(&mut self.charge, snapshot.current, elapsed_s);
        let (health, cycle_counted) = self.health_estimator.update(&mut self.charge);
        self.health = health;
        if cycle_counted {
            tracing::info!("Charge cycle counted, total cycles: {}", self.charge.charge_cycles);
        }

        let proposal = resolve(snapshot, health.state_of_health_percent, &self.limits);
        let previous = self.state;
        self.state = next_state(previous, proposal);
        let transitioned = self.state != previous;

        if transitioned {
            self.sink.on_transition(previous, self.state);
            if self.state == SystemState::Fault {
                if let Some(description) = describe_faults(snapshot, &self.limits) {
                    self.sink.on_fault(&description);
                }
            }
        }

        tracing::debug!(
            "Tick: proposal={:?} state={:?} soc={:.2}% soh={:.2}%",
            proposal,
            self.state,
            self.charge.state_of_charge_percent,
            health.state_of_health_percent
        );

        Ok(TickOutcome {
            state: self.state,
            proposal,
            state_of_charge_percent: self.charge.state_of_charge_percent,
            state_of_health_percent: health.state_of_health_percent,
            is_charging: self.is_charging,
            transitioned,
        })
    }

    pub fn current_state(&self) -> SystemState {
        self.state
    }

    pub fn current_soc(&self) -> f64 {
        self.charge.state_of_charge_percent
    }

    pub fn current_soh(&self) -> f64 {
        self.health.state_of_health_percent
    }

    pub fn pack_current(&self) -> f64 {
        self.pack_current
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            accumulated_charge_mah: self.charge.accumulated_charge,
            charge_cycles: self.charge.charge_cycles,
            state_of_health_percent: self.health.state_of_health_percent,
            system_state: self.state,
            was_full: self.charge.was_full,
            was_empty: self.charge.was_empty,
            saved_at: Utc::now(),
        }
    }
}
