// Main entry point - Wiring and the sampling loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::application::battery_monitor::BatteryMonitor;
use crate::application::sensor_source::SensorSource;
use crate::domain::system_state::SystemState;
use crate::infrastructure::config::{load_bms_config, BmsConfig, SensorConfig};
use crate::infrastructure::hardware_sensor::HardwareSensor;
use crate::infrastructure::simulated_sensor::SimulatedSensor;
use crate::infrastructure::state_store::StateStore;
use crate::infrastructure::tracing_event_sink::TracingEventSink;
use crate::presentation::console::{state_label, TickReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_bms_config()?;

    // Restore or create the monitor
    let store = config.state_file.clone().map(StateStore::new);
    let sink = Arc::new(TracingEventSink);
    let mut monitor = match &store {
        Some(store) => match store.load().await? {
            Some(persisted) => {
                tracing::info!("Restoring state saved at {}", persisted.saved_at);
                BatteryMonitor::restore(&config, sink, &persisted)?
            }
            None => BatteryMonitor::new(&config, sink)?,
        },
        None => BatteryMonitor::new(&config, sink)?,
    };

    let mut sensor = build_sensor(&config);

    tracing::info!(
        "BMS initialized with {} cells ({} sensor)",
        monitor.cell_count(),
        sensor.name()
    );
    tracing::info!("Initial state: {}", state_label(monitor.current_state()));
    tracing::info!("Initial SoC: {:.0}%", monitor.current_soc());
    tracing::info!("Initial SoH: {:.0}%", monitor.current_soh());

    let period = Duration::from_millis(config.sampling.update_interval_ms);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run(&mut monitor, &mut *sensor, store.as_ref(), period, shutdown).await?;

    if let Some(store) = &store {
        store.save(&monitor.persisted()).await?;
    }

    Ok(())
}

/// Samples the pack every `period` until `shutdown` resolves.
async fn run(
    monitor: &mut BatteryMonitor,
    sensor: &mut dyn SensorSource,
    store: Option<&StateStore>,
    period: Duration,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut clock = TickClock::new(period);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let elapsed_s = clock.elapsed_s(now);

        let snapshot = match sensor.read_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Sensor read failed, skipping tick: {:#}", e);
                continue;
            }
        };

        let outcome = match monitor.tick(&snapshot, elapsed_s) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Rejected snapshot: {}", e);
                continue;
            }
        };
        clock.advance(now);
        TickReport::new(&snapshot, &outcome).emit();

        if let Some(store) = store {
            if let Err(e) = store.save(&monitor.persisted()).await {
                tracing::warn!("Could not persist state: {:#}", e);
            }
        }

        if monitor.current_state() == SystemState::Fault {
            tracing::error!(
                "BMS in FAULT state (pack current {:.2}A). Simulation continuing for \
                 demonstration, but real system would halt.",
                monitor.pack_current()
            );
        }
    }

    Ok(())
}

/// Time since the last accepted tick. Skipped ticks do not move it, so the
/// next accepted tick integrates the whole gap.
struct TickClock {
    period: Duration,
    last: Option<Instant>,
}

impl TickClock {
    fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    fn elapsed_s(&self, now: Instant) -> f64 {
        self.last
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(self.period)
            .as_secs_f64()
    }

    fn advance(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

fn build_sensor(config: &BmsConfig) -> Box<dyn SensorSource> {
    match &config.sensor {
        SensorConfig::Simulated(settings) => Box::new(SimulatedSensor::new(
            config.pack.cell_count,
            settings.clone(),
            config.limits,
        )),
        SensorConfig::Hardware(settings) => {
            Box::new(HardwareSensor::new(settings.sample_path.clone()))
        }
    }
}
