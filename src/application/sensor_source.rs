// Sensor port - Where each tick's pack snapshot comes from
use crate::domain::cell::PackSnapshot;
use async_trait::async_trait;

#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Sample every cell and the pack current once
    async fn read_snapshot(&mut self) -> anyhow::Result<PackSnapshot>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
