// Reportable-event port
use crate::domain::system_state::SystemState;

/// Receives state changes from the engine.
pub trait EventSink: Send + Sync {
    /// Called exactly once for every tick whose new state differs from the old one.
    fn on_transition(&self, old: SystemState, new: SystemState);

    /// Called after `on_transition` when the new state is Fault.
    fn on_fault(&self, description: &str);
}
