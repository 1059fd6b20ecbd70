// Severity resolver - Combines every reading of a tick into one proposed state
use crate::domain::cell::{CellReading, PackSnapshot};
use crate::domain::system_state::SystemState;
use crate::domain::thresholds::SafetyLimits;

/// Worst condition present anywhere in the pack.
///
/// Any cell outside its fault limits wins outright. Otherwise the proposal is
/// the most severe tier among every cell's voltage and temperature, the pack
/// current and the health percentage. Current and health never classify as
/// Fault, so only cells can fault the pack.
pub fn resolve(
    snapshot: &PackSnapshot,
    state_of_health_percent: f64,
    limits: &SafetyLimits,
) -> SystemState {
    let cell_tier = |c: &CellReading| {
        limits
            .voltage
            .classify(c.voltage)
            .max(limits.temperature.classify(c.temperature))
    };

    if snapshot.cells.iter().any(|c| cell_tier(c) == SystemState::Fault) {
        return SystemState::Fault;
    }

    snapshot
        .cells
        .iter()
        .map(cell_tier)
        .chain([
            limits.current.classify(snapshot.current),
            limits.health.classify(state_of_health_percent),
        ])
        .max()
        .unwrap_or(SystemState::Normal)
}

/// Names the cell readings outside the fault limits, `None` if there are none.
pub fn describe_faults(snapshot: &PackSnapshot, limits: &SafetyLimits) -> Option<String> {
    let findings: Vec<String> = snapshot
        .cells
        .iter()
        .flat_map(|c| {
            let voltage = limits
                .voltage
                .is_fault(c.voltage)
                .then(|| format!("cell {} voltage {:.3}V", c.id, c.voltage));
            let temperature = limits
                .temperature
                .is_fault(c.temperature)
                .then(|| format!("cell {} temperature {:.1}C", c.id, c.temperature));
            voltage.into_iter().chain(temperature)
        })
        .collect();

    if findings.is_empty() {
        return None;
    }
    Some(format!(
        "pack entered FAULT state: {} outside fault limits",
        findings.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal() -> PackSnapshot {
        PackSnapshot::uniform(4, 3.7, 25.0, 1.0)
    }

    #[test]
    fn test_all_normal() {
        assert_eq!(resolve(&nominal(), 100.0, &SafetyLimits::default()), SystemState::Normal);
    }

    #[test]
    fn test_single_cell_fault_dominates() {
        let limits = SafetyLimits::default();
        let mut snapshot = nominal();
        snapshot.cells[2].voltage = 4.9;
        // Everything else as bad as it can be without faulting.
        snapshot.current = -50.0;
        snapshot.cells[0].temperature = 55.0;
        assert_eq!(resolve(&snapshot, 10.0, &limits), SystemState::Fault);

        let mut snapshot = nominal();
        snapshot.cells[3].temperature = -30.0;
        assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Fault);
    }

    #[test]
    fn test_pack_level_critical() {
        let limits = SafetyLimits::default();
        let mut snapshot = nominal();
        snapshot.current = -18.0;
        assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Critical);

        assert_eq!(resolve(&nominal(), 55.0, &limits), SystemState::Critical);
    }

    #[test]
    fn test_critical_beats_warning() {
        let limits = SafetyLimits::default();
        let mut snapshot = nominal();
        snapshot.cells[0].voltage = 2.9;
        snapshot.cells[1].temperature = 55.0;
        assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Critical);
    }

    #[test]
    fn test_warning_sources() {
        let limits = SafetyLimits::default();

        let mut snapshot = nominal();
        snapshot.current = 2.5;
        assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Warning);

        assert_eq!(resolve(&nominal(), 70.0, &limits), SystemState::Warning);

        let mut snapshot = nominal();
        snapshot.cells[3].temperature = 47.0;
        assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Warning);
    }

    #[test]
    fn test_pack_current_alone_never_faults() {
        let limits = SafetyLimits::default();
        for current in [-500.0, -25.0, 10.0, 500.0] {
            let mut snapshot = nominal();
            snapshot.current = current;
            assert_eq!(resolve(&snapshot, 100.0, &limits), SystemState::Critical);
        }
    }

    #[test]
    fn test_cell_order_does_not_matter() {
        let limits = SafetyLimits::default();
        let cells = vec![
            CellReading::new(0, 3.7, 25.0),
            CellReading::new(1, 2.9, 25.0),
            CellReading::new(2, 3.7, 52.0),
            CellReading::new(3, 3.7, 25.0),
        ];
        let forward = PackSnapshot::new(cells.clone(), 0.0);
        let reversed = PackSnapshot::new(cells.into_iter().rev().collect(), 0.0);
        assert_eq!(resolve(&forward, 100.0, &limits), resolve(&reversed, 100.0, &limits));
        assert_eq!(resolve(&forward, 100.0, &limits), SystemState::Critical);
    }

    #[test]
    fn test_monotonic_in_cell_severity() {
        let limits = SafetyLimits::default();
        // Voltages ordered from best to worst tier.
        let ladder = [3.7, 4.25, 4.35, 4.9];
        let mut previous = SystemState::Normal;
        for voltage in ladder {
            let mut snapshot = nominal();
            snapshot.cells[1].voltage = voltage;
            let proposal = resolve(&snapshot, 100.0, &limits);
            assert!(proposal >= previous, "{voltage}V resolved to {proposal:?}");
            assert_eq!(proposal, limits.voltage.classify(voltage));
            previous = proposal;
        }
    }

    /// Resolves each value with every other parameter nominal and checks the
    /// proposals never get better as the value walks to a worse tier.
    fn assert_ladder(values: &[f64], build: impl Fn(f64) -> (PackSnapshot, f64)) {
        let limits = SafetyLimits::default();
        let mut previous = SystemState::Normal;
        for &value in values {
            let (snapshot, soh) = build(value);
            let proposal = resolve(&snapshot, soh, &limits);
            assert!(proposal >= previous, "{value} resolved to {proposal:?} after {previous:?}");
            previous = proposal;
        }
    }

    #[test]
    fn test_monotonic_in_temperature() {
        assert_ladder(&[25.0, 48.0, 55.0, 65.0, 75.0], |t| {
            let mut snapshot = nominal();
            snapshot.cells[0].temperature = t;
            (snapshot, 100.0)
        });
        assert_ladder(&[25.0, -3.0, -8.0, -15.0, -25.0], |t| {
            let mut snapshot = nominal();
            snapshot.cells[3].temperature = t;
            (snapshot, 100.0)
        });
    }

    #[test]
    fn test_monotonic_in_current() {
        let charge = [0.0, 1.0, 2.0, 2.5, 3.0, 3.5, 4.0, 9.0];
        assert_ladder(&charge, |i| (PackSnapshot::uniform(4, 3.7, 25.0, i), 100.0));

        let discharge = [0.0, -5.0, -10.0, -12.0, -15.0, -18.0, -20.0, -50.0];
        assert_ladder(&discharge, |i| (PackSnapshot::uniform(4, 3.7, 25.0, i), 100.0));
    }

    #[test]
    fn test_monotonic_in_health() {
        assert_ladder(&[100.0, 80.0, 79.0, 60.0, 59.0, 0.0], |soh| (nominal(), soh));
    }

    #[test]
    fn test_componentwise_worse_snapshot_is_not_better() {
        let limits = SafetyLimits::default();
        let better = PackSnapshot::new(
            vec![
                CellReading::new(0, 3.7, 25.0),
                CellReading::new(1, 4.25, 25.0),
                CellReading::new(2, 3.7, 47.0),
                CellReading::new(3, 2.9, 25.0),
            ],
            -11.0,
        );
        let worse = PackSnapshot::new(
            vec![
                CellReading::new(0, 4.25, 30.0),
                CellReading::new(1, 4.35, 25.0),
                CellReading::new(2, 3.7, 48.0),
                CellReading::new(3, 2.85, -2.0),
            ],
            -16.0,
        );
        let a = resolve(&better, 85.0, &limits);
        let b = resolve(&worse, 70.0, &limits);
        assert_eq!(a, SystemState::Warning);
        assert_eq!(b, SystemState::Critical);
        assert!(a <= b);
    }

    #[test]
    fn test_describe_faults_names_cells() {
        let limits = SafetyLimits::default();
        let mut snapshot = nominal();
        snapshot.cells[2].voltage = 4.9;
        snapshot.cells[0].temperature = 75.0;
        let description = describe_faults(&snapshot, &limits).unwrap();
        assert!(description.contains("cell 2 voltage 4.900V"));
        assert!(description.contains("cell 0 temperature 75.0C"));
    }

    #[test]
    fn test_describe_faults_without_faulted_cells() {
        let mut snapshot = nominal();
        snapshot.cells[1].voltage = 4.6;
        assert_eq!(describe_faults(&snapshot, &SafetyLimits::default()), None);
    }
}
