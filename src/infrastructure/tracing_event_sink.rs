// Event sink that reports state changes through tracing
use crate::application::event_sink::EventSink;
use crate::domain::system_state::SystemState;

#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn on_transition(&self, old: SystemState, new: SystemState) {
        if new > old {
            tracing::warn!("BMS state transition: {:?} -> {:?}", old, new);
        } else {
            tracing::info!("BMS state transition: {:?} -> {:?}", old, new);
        }
    }

    fn on_fault(&self, description: &str) {
        tracing::error!("[FAULT] {} - immediate action required", description);
    }
}
