// Errors raised at the engine boundary

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BmsError {
    #[error("Snapshot has {actual} cells, pack is configured for {expected}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("Cell id {id} appears more than once in the snapshot")]
    DuplicateCellId { id: u8 },

    #[error("Cell id {id} is outside the pack (cell count {cell_count})")]
    CellIdOutOfRange { id: u8, cell_count: usize },

    #[error(
        "Non-finite {field} reading{}: {value}",
        .cell.map(|c| format!(" on cell {c}")).unwrap_or_default()
    )]
    NonFiniteReading {
        field: &'static str,
        cell: Option<u8>,
        value: f64,
    },

    #[error("Elapsed time must be finite and non-negative, got {0}")]
    InvalidElapsed(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Persisted state is unusable: {0}")]
    InvalidPersistedState(String),
}
