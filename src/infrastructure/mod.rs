// Infrastructure layer - Configuration, sensor backends and adapters
pub mod config;
pub mod hardware_sensor;
pub mod simulated_sensor;
pub mod state_store;
pub mod tracing_event_sink;
