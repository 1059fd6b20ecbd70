// Hardware sensor backend - Reads samples exported by the acquisition front-end
use crate::application::sensor_source::SensorSource;
use crate::domain::cell::{CellReading, PackSnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HardwareSensor {
    sample_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    current: f64,
    cells: Vec<RawCell>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    voltage: f64,
    temperature: f64,
}

impl HardwareSensor {
    pub fn new(sample_path: PathBuf) -> Self {
        Self { sample_path }
    }

    fn parse(&self, text: &str) -> Result<PackSnapshot> {
        let raw: RawSample = serde_json::from_str(text)
            .with_context(|| format!("Malformed sample in {}", self.sample_path.display()))?;

        let cells = raw
            .cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                let id = u8::try_from(index).context("Too many cells in sample")?;
                Ok(CellReading::new(id, cell.voltage, cell.temperature))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PackSnapshot::new(cells, raw.current))
    }
}

#[async_trait]
impl SensorSource for HardwareSensor {
    async fn read_snapshot(&mut self) -> Result<PackSnapshot> {
        let text = tokio::fs::read_to_string(&self.sample_path)
            .await
            .with_context(|| format!("Failed to read {}", self.sample_path.display()))?;

        self.parse(&text)
    }

    fn name(&self) -> &'static str {
        "hardware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bms-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_reads_sample_file() {
        let path = temp_path("sample.json");
        tokio::fs::write(
            &path,
            r#"{"current": -2.5, "cells": [
                {"voltage": 3.71, "temperature": 24.0},
                {"voltage": 3.69, "temperature": 25.5}
            ]}"#,
        )
        .await
        .unwrap();

        let mut sensor = HardwareSensor::new(path.clone());
        let snapshot = sensor.read_snapshot().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(snapshot.current, -2.5);
        assert_eq!(snapshot.cells.len(), 2);
        assert_eq!(snapshot.cells[1], CellReading::new(1, 3.69, 25.5));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let mut sensor = HardwareSensor::new(temp_path("does-not-exist.json"));
        assert!(sensor.read_snapshot().await.is_err());
    }

    #[test]
    fn test_malformed_sample_is_an_error() {
        let sensor = HardwareSensor::new(PathBuf::from("sample.json"));
        assert!(sensor.parse(r#"{"cells": []}"#).is_err());
        assert!(sensor.parse("not json").is_err());
    }
}
