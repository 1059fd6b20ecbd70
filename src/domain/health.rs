// Cycle-based state-of-health estimation
use super::charge::ChargeState;

/// Health percentage derived from counted charge cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthState {
    pub state_of_health_percent: f64,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            state_of_health_percent: 100.0,
        }
    }
}

/// Counts half cycles from full/empty boundary crossings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthEstimator {
    full_threshold_percent: f64,
    empty_threshold_percent: f64,
    degradation_per_cycle_percent: f64,
}

impl HealthEstimator {
    pub fn new(
        full_threshold_percent: f64,
        empty_threshold_percent: f64,
        degradation_per_cycle_percent: f64,
    ) -> Self {
        Self {
            full_threshold_percent,
            empty_threshold_percent,
            degradation_per_cycle_percent,
        }
    }

    /// Latches the boundary flags from the current SoC and counts a half
    /// cycle once both are set. Returns the recomputed health and whether a
    /// half cycle was counted on this call.
    pub fn update(&self, charge: &mut ChargeState) -> (HealthState, bool) {
        if charge.state_of_charge_percent >= self.full_threshold_percent {
            charge.was_full = true;
        }
        if charge.state_of_charge_percent <= self.empty_threshold_percent {
            charge.was_empty = true;
        }

        let counted = charge.was_full && charge.was_empty;
        if counted {
            charge.charge_cycles += 0.5;
            charge.was_full = false;
            charge.was_empty = false;
        }

        (self.health_for(charge.charge_cycles), counted)
    }

    /// Pure function of the cycle count.
    pub fn health_for(&self, charge_cycles: f64) -> HealthState {
        HealthState {
            state_of_health_percent: (100.0 - charge_cycles * self.degradation_per_cycle_percent)
                .clamp(0.0, 100.0),
        }
    }
}
