// Threshold tables and per-parameter severity classification
use super::error::BmsError;
use super::system_state::SystemState;
use serde::{Deserialize, Serialize};

/// Two-sided tier boundaries for voltage (V) or temperature (°C).
///
/// `low_fault < low_critical < low_warning < low_normal <= high_normal
///  < high_warning < high_critical < high_fault`. A value sitting exactly on
/// a boundary belongs to the less severe side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandLimits {
    pub low_fault: f64,
    pub low_critical: f64,
    pub low_warning: f64,
    pub low_normal: f64,
    pub high_normal: f64,
    pub high_warning: f64,
    pub high_critical: f64,
    pub high_fault: f64,
}

impl BandLimits {
    pub fn voltage() -> Self {
        Self {
            low_fault: 1.00,
            low_critical: 2.50,
            low_warning: 2.80,
            low_normal: 3.00,
            high_normal: 4.20,
            high_warning: 4.30,
            high_critical: 4.40,
            high_fault: 4.80,
        }
    }

    pub fn temperature() -> Self {
        Self {
            low_fault: -20.0,
            low_critical: -10.0,
            low_warning: -5.0,
            low_normal: 0.0,
            high_normal: 45.0,
            high_warning: 50.0,
            high_critical: 60.0,
            high_fault: 70.0,
        }
    }

    pub fn is_normal(&self, value: f64) -> bool {
        value >= self.low_normal && value <= self.high_normal
    }

    pub fn is_warning(&self, value: f64) -> bool {
        (value >= self.low_warning && value < self.low_normal)
            || (value > self.high_normal && value <= self.high_warning)
    }

    /// Everything between the warning band and the fault limits, inclusive of
    /// the fault limits themselves.
    pub fn is_critical(&self, value: f64) -> bool {
        (value >= self.low_fault && value < self.low_warning)
            || (value > self.high_warning && value <= self.high_fault)
    }

    pub fn is_fault(&self, value: f64) -> bool {
        value < self.low_fault || value > self.high_fault
    }

    pub fn classify(&self, value: f64) -> SystemState {
        if self.is_fault(value) {
            SystemState::Fault
        } else if self.is_critical(value) {
            SystemState::Critical
        } else if self.is_warning(value) {
            SystemState::Warning
        } else {
            debug_assert!(self.is_normal(value));
            SystemState::Normal
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), BmsError> {
        let ascending = [
            self.low_fault,
            self.low_critical,
            self.low_warning,
            self.low_normal,
        ];
        let descending = [
            self.high_fault,
            self.high_critical,
            self.high_warning,
            self.high_normal,
        ];

        if ascending.iter().chain(descending.iter()).any(|v| !v.is_finite()) {
            return Err(BmsError::InvalidConfig(format!("{name} limits must be finite")));
        }
        let strictly_ordered = ascending.windows(2).all(|w| w[0] < w[1])
            && descending.windows(2).all(|w| w[0] > w[1]);
        if !strictly_ordered || self.low_normal > self.high_normal {
            return Err(BmsError::InvalidConfig(format!(
                "{name} limits must satisfy low_fault < low_critical < low_warning < low_normal \
                 <= high_normal < high_warning < high_critical < high_fault"
            )));
        }
        Ok(())
    }
}

/// Direction-aware current ceilings (A, magnitudes).
///
/// Inside `[-idle_threshold, idle_threshold]` the pack is idle and always
/// Normal. There is no Fault tier for current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentLimits {
    pub idle_threshold: f64,
    pub charge_normal: f64,
    pub charge_warning: f64,
    pub charge_critical: f64,
    pub discharge_normal: f64,
    pub discharge_warning: f64,
    pub discharge_critical: f64,
}

impl Default for CurrentLimits {
    fn default() -> Self {
        Self {
            idle_threshold: 0.05,
            charge_normal: 2.0,
            charge_warning: 3.0,
            charge_critical: 4.0,
            discharge_normal: 10.0,
            discharge_warning: 15.0,
            discharge_critical: 20.0,
        }
    }
}

/// Which way current is flowing relative to the idle band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentDirection {
    Charging,
    Discharging,
    Idle,
}

impl CurrentLimits {
    pub fn direction(&self, current: f64) -> CurrentDirection {
        if current > self.idle_threshold {
            CurrentDirection::Charging
        } else if current < -self.idle_threshold {
            CurrentDirection::Discharging
        } else {
            CurrentDirection::Idle
        }
    }

    /// Magnitude together with the (normal, warning) ceilings for its direction.
    fn ceilings(&self, current: f64) -> Option<(f64, f64, f64)> {
        match self.direction(current) {
            CurrentDirection::Charging => Some((current, self.charge_normal, self.charge_warning)),
            CurrentDirection::Discharging => {
                Some((-current, self.discharge_normal, self.discharge_warning))
            }
            CurrentDirection::Idle => None,
        }
    }

    pub fn is_normal(&self, current: f64) -> bool {
        self.ceilings(current)
            .is_none_or(|(magnitude, normal, _)| magnitude <= normal)
    }

    pub fn is_warning(&self, current: f64) -> bool {
        self.ceilings(current)
            .is_some_and(|(magnitude, normal, warning)| magnitude > normal && magnitude <= warning)
    }

    /// Above the warning ceiling, including beyond the critical ceiling.
    pub fn is_critical(&self, current: f64) -> bool {
        self.ceilings(current)
            .is_some_and(|(magnitude, _, warning)| magnitude > warning)
    }

    pub fn classify(&self, current: f64) -> SystemState {
        if self.is_critical(current) {
            SystemState::Critical
        } else if self.is_warning(current) {
            SystemState::Warning
        } else {
            debug_assert!(self.is_normal(current));
            SystemState::Normal
        }
    }

    pub fn validate(&self) -> Result<(), BmsError> {
        let charge = [
            self.idle_threshold,
            self.charge_normal,
            self.charge_warning,
            self.charge_critical,
        ];
        let discharge = [
            self.idle_threshold,
            self.discharge_normal,
            self.discharge_warning,
            self.discharge_critical,
        ];
        let ok = self.idle_threshold.is_finite()
            && self.idle_threshold > 0.0
            && charge.windows(2).all(|w| w[0] < w[1])
            && discharge.windows(2).all(|w| w[0] < w[1])
            && self.charge_critical.is_finite()
            && self.discharge_critical.is_finite();
        if !ok {
            return Err(BmsError::InvalidConfig(
                "current limits must satisfy 0 < idle_threshold < normal < warning < critical \
                 in both directions"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// State-of-health floors (%). There is no Fault tier for health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthLimits {
    pub warning_floor: f64,
    pub critical_floor: f64,
}

impl Default for HealthLimits {
    fn default() -> Self {
        Self {
            warning_floor: 80.0,
            critical_floor: 60.0,
        }
    }
}

impl HealthLimits {
    pub fn is_normal(&self, soh: f64) -> bool {
        soh >= self.warning_floor
    }

    pub fn is_warning(&self, soh: f64) -> bool {
        soh >= self.critical_floor && soh < self.warning_floor
    }

    pub fn is_critical(&self, soh: f64) -> bool {
        soh < self.critical_floor
    }

    pub fn classify(&self, soh: f64) -> SystemState {
        if self.is_critical(soh) {
            SystemState::Critical
        } else if self.is_warning(soh) {
            SystemState::Warning
        } else {
            debug_assert!(self.is_normal(soh));
            SystemState::Normal
        }
    }

    pub fn validate(&self) -> Result<(), BmsError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.warning_floor)
            || !in_range(self.critical_floor)
            || self.critical_floor >= self.warning_floor
        {
            return Err(BmsError::InvalidConfig(
                "health limits must satisfy 0 <= critical_floor < warning_floor <= 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// The four boundary tables consulted by the severity resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyLimits {
    pub voltage: BandLimits,
    pub temperature: BandLimits,
    pub current: CurrentLimits,
    pub health: HealthLimits,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            voltage: BandLimits::voltage(),
            temperature: BandLimits::temperature(),
            current: CurrentLimits::default(),
            health: HealthLimits::default(),
        }
    }
}

impl SafetyLimits {
    pub fn validate(&self) -> Result<(), BmsError> {
        self.voltage.validate("voltage")?;
        self.temperature.validate("temperature")?;
        self.current.validate()?;
        self.health.validate()
    }
}
