// Coulomb-counting state-of-charge estimation
use super::thresholds::{CurrentDirection, CurrentLimits};

const SECONDS_PER_HOUR: f64 = 3600.0;
const MILLIAMPS_PER_AMP: f64 = 1000.0;

/// Charge bookkeeping that persists across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeState {
    /// mAh, always within `[0, nominal_capacity]`.
    pub accumulated_charge: f64,
    pub state_of_charge_percent: f64,
    pub was_full: bool,
    pub was_empty: bool,
    /// Counted in half cycles, never decreases.
    pub charge_cycles: f64,
}

impl ChargeState {
    pub fn at_percent(nominal_capacity_mah: f64, percent: f64) -> Self {
        let percent = percent.clamp(0.0, 100.0);
        Self {
            accumulated_charge: nominal_capacity_mah * percent / 100.0,
            state_of_charge_percent: percent,
            was_full: false,
            was_empty: false,
            charge_cycles: 0.0,
        }
    }
}

/// Open-loop current integrator. Drift is never corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeEstimator {
    nominal_capacity_mah: f64,
    charge_efficiency: f64,
    current_limits: CurrentLimits,
}

impl ChargeEstimator {
    pub fn new(
        nominal_capacity_mah: f64,
        charge_efficiency: f64,
        current_limits: CurrentLimits,
    ) -> Self {
        Self {
            nominal_capacity_mah,
            charge_efficiency,
            current_limits,
        }
    }

    pub fn nominal_capacity_mah(&self) -> f64 {
        self.nominal_capacity_mah
    }

    /// Integrates `current` (A) over `elapsed_s` into `state`.
    pub fn integrate(&self, state: &mut ChargeState, current: f64, elapsed_s: f64) {
        // Hours first: a zero interval must stay zero even for huge currents.
        let mut delta_mah = current * (elapsed_s / SECONDS_PER_HOUR) * MILLIAMPS_PER_AMP;
        if self.current_limits.direction(current) == CurrentDirection::Charging {
            delta_mah *= self.charge_efficiency;
        }
        if delta_mah.is_nan() {
            return;
        }

        state.accumulated_charge =
            (state.accumulated_charge + delta_mah).clamp(0.0, self.nominal_capacity_mah);
        self.refresh_percent(state);
    }

    /// Recomputes the percentage from accumulated charge.
    pub fn refresh_percent(&self, state: &mut ChargeState) {
        state.state_of_charge_percent =
            (state.accumulated_charge / self.nominal_capacity_mah * 100.0).clamp(0.0, 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ChargeEstimator {
        ChargeEstimator::new(3000.0, 0.98, CurrentLimits::default())
    }

    #[test]
    fn test_charging_applies_efficiency() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 50.0);
        est.integrate(&mut state, 1.0, 3600.0);
        assert!((state.accumulated_charge - 2480.0).abs() < 1e-9);
        assert!((state.state_of_charge_percent - (50.0 + 98.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_discharging_ignores_efficiency() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 50.0);
        est.integrate(&mut state, -1.5, 3600.0);
        assert!((state.accumulated_charge - 0.0).abs() < 1e-9);

        let mut state = ChargeState::at_percent(3000.0, 50.0);
        est.integrate(&mut state, -0.6, 1800.0);
        assert!((state.accumulated_charge - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_current_still_integrates_without_efficiency() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 50.0);
        est.integrate(&mut state, 0.03, 3600.0);
        assert!((state.accumulated_charge - 1530.0).abs() < 1e-9);
    }

    #[test]
    fn test_soc_clamps_at_full() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 90.0);
        est.integrate(&mut state, 5.0, 36_000.0);
        assert_eq!(state.state_of_charge_percent, 100.0);
        assert_eq!(state.accumulated_charge, 3000.0);
    }

    #[test]
    fn test_soc_clamps_at_empty() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 5.0);
        est.integrate(&mut state, -20.0, 36_000.0);
        assert_eq!(state.state_of_charge_percent, 0.0);
        assert_eq!(state.accumulated_charge, 0.0);
    }

    #[test]
    fn test_zero_elapsed_is_a_no_op() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 42.0);
        est.integrate(&mut state, 3.0, 0.0);
        assert_eq!(state.accumulated_charge, 1260.0);
        assert!((state.state_of_charge_percent - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_current_stays_finite() {
        let est = estimator();
        let mut state = ChargeState::at_percent(3000.0, 42.0);
        est.integrate(&mut state, 1e306, 0.0);
        assert_eq!(state.accumulated_charge, 1260.0);
        assert!(state.state_of_charge_percent.is_finite());

        est.integrate(&mut state, 1e306, 1e10);
        assert_eq!(state.state_of_charge_percent, 100.0);

        est.integrate(&mut state, -1e306, 1e10);
        assert_eq!(state.state_of_charge_percent, 0.0);
        assert_eq!(state.accumulated_charge, 0.0);
    }
}
