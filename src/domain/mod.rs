// Domain layer - Pure battery pack models and estimators
pub mod cell;
pub mod charge;
pub mod error;
pub mod health;
pub mod system_state;
pub mod thresholds;
