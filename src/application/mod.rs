// Application layer - The evaluation engine and the ports it talks through
pub mod battery_monitor;
pub mod event_sink;
pub mod sensor_source;
pub mod severity_resolver;
pub mod transition_policy;
