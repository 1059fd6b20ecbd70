// Cell readings and per-tick pack snapshots
use super::error::BmsError;

/// One cell's voltage and temperature at a sample instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellReading {
    pub id: u8,
    pub voltage: f64,
    pub temperature: f64,
}

impl CellReading {
    pub fn new(id: u8, voltage: f64, temperature: f64) -> Self {
        Self {
            id,
            voltage,
            temperature,
        }
    }
}

/// All cell readings for one tick plus the pack current.
///
/// Current is in Amperes: positive while net charging, negative while
/// net discharging.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSnapshot {
    pub cells: Vec<CellReading>,
    pub current: f64,
}

impl PackSnapshot {
    pub fn new(cells: Vec<CellReading>, current: f64) -> Self {
        Self { cells, current }
    }

    /// Every cell reads the same voltage and temperature.
    #[cfg(test)]
    pub fn uniform(cell_count: usize, voltage: f64, temperature: f64, current: f64) -> Self {
        let cells = (0..cell_count)
            .map(|i| CellReading::new(i as u8, voltage, temperature))
            .collect();
        Self { cells, current }
    }

    /// Checks the snapshot against the configured pack before it reaches the engine.
    pub fn validate(&self, cell_count: usize) -> Result<(), BmsError> {
        if self.cells.len() != cell_count {
            return Err(BmsError::CellCountMismatch {
                expected: cell_count,
                actual: self.cells.len(),
            });
        }

        if !self.current.is_finite() {
            return Err(BmsError::NonFiniteReading {
                field: "current",
                cell: None,
                value: self.current,
            });
        }

        let mut seen = vec![false; cell_count];
        for cell in &self.cells {
            let slot = seen
                .get_mut(cell.id as usize)
                .ok_or(BmsError::CellIdOutOfRange {
                    id: cell.id,
                    cell_count,
                })?;
            if *slot {
                return Err(BmsError::DuplicateCellId { id: cell.id });
            }
            *slot = true;

            if !cell.voltage.is_finite() {
                return Err(BmsError::NonFiniteReading {
                    field: "voltage",
                    cell: Some(cell.id),
                    value: cell.voltage,
                });
            }
            if !cell.temperature.is_finite() {
                return Err(BmsError::NonFiniteReading {
                    field: "temperature",
                    cell: Some(cell.id),
                    value: cell.temperature,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_uniform_snapshot_ids() {
        let snapshot = PackSnapshot::uniform(4, 3.7, 25.0, 1.0);
        let ids: Vec<u8> = snapshot.cells.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(snapshot.validate(4).is_ok());
    }

    #[test]
    fn test_rejects_wrong_cardinality() {
        let snapshot = PackSnapshot::uniform(3, 3.7, 25.0, 0.0);
        assert_matches!(
            snapshot.validate(4),
            Err(BmsError::CellCountMismatch { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn test_rejects_duplicate_and_out_of_range_ids() {
        let duplicate = PackSnapshot::new(
            vec![CellReading::new(0, 3.7, 25.0), CellReading::new(0, 3.7, 25.0)],
            0.0,
        );
        assert_matches!(duplicate.validate(2), Err(BmsError::DuplicateCellId { id: 0 }));

        let out_of_range = PackSnapshot::new(
            vec![CellReading::new(0, 3.7, 25.0), CellReading::new(5, 3.7, 25.0)],
            0.0,
        );
        assert_matches!(
            out_of_range.validate(2),
            Err(BmsError::CellIdOutOfRange { id: 5, cell_count: 2 })
        );
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut snapshot = PackSnapshot::uniform(2, 3.7, 25.0, 0.0);
        snapshot.cells[1].temperature = f64::NAN;
        assert_matches!(
            snapshot.validate(2),
            Err(BmsError::NonFiniteReading { field: "temperature", cell: Some(1), .. })
        );

        let snapshot = PackSnapshot::uniform(2, 3.7, 25.0, f64::INFINITY);
        assert_matches!(
            snapshot.validate(2),
            Err(BmsError::NonFiniteReading { field: "current", cell: None, .. })
        );
    }

    #[test]
    fn test_cell_order_is_not_significant() {
        let snapshot = PackSnapshot::new(
            vec![
                CellReading::new(2, 3.7, 25.0),
                CellReading::new(0, 3.7, 25.0),
                CellReading::new(1, 3.7, 25.0),
            ],
            0.0,
        );
        assert!(snapshot.validate(3).is_ok());
    }
}
