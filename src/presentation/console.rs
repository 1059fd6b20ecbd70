// Console rendering of pack state and per-tick reports
use crate::application::battery_monitor::TickOutcome;
use crate::domain::cell::PackSnapshot;
use crate::domain::system_state::SystemState;

pub fn state_label(state: SystemState) -> &'static str {
    match state {
        SystemState::Normal => "NORMAL",
        SystemState::Warning => "WARNING",
        SystemState::Critical => "CRITICAL",
        SystemState::Fault => "FAULT",
    }
}

pub fn state_advisory(state: SystemState) -> &'static str {
    match state {
        SystemState::Normal => "BMS operating normally.",
        SystemState::Warning => "BMS in WARNING state. Check parameters!",
        SystemState::Critical => {
            "BMS in CRITICAL state. Prepare for shutdown or severe limitation!"
        }
        SystemState::Fault => "BMS in FAULT state. A real system would halt here.",
    }
}

/// One tick's readings and outcome, ready to print.
pub struct TickReport<'a> {
    snapshot: &'a PackSnapshot,
    outcome: &'a TickOutcome,
}

impl<'a> TickReport<'a> {
    pub fn new(snapshot: &'a PackSnapshot, outcome: &'a TickOutcome) -> Self {
        Self { snapshot, outcome }
    }

    pub fn cell_lines(&self) -> Vec<String> {
        self.snapshot
            .cells
            .iter()
            .map(|c| {
                format!(
                    "Cell {}: Voltage = {:.3}V, Temperature = {:.1}C",
                    c.id, c.voltage, c.temperature
                )
            })
            .collect()
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Current BMS State: {} | SoC: {:.1}% | SoH: {:.1}% | Charging: {}",
            state_label(self.outcome.state),
            self.outcome.state_of_charge_percent,
            self.outcome.state_of_health_percent,
            if self.outcome.is_charging { "YES" } else { "NO" }
        );
        if self.outcome.transitioned {
            line.push_str(" [changed]");
        } else if self.outcome.proposal != self.outcome.state {
            line.push_str(&format!(" [held, readings {}]", state_label(self.outcome.proposal)));
        }
        line
    }

    pub fn emit(&self) {
        for line in self.cell_lines() {
            tracing::info!("{}", line);
        }
        tracing::info!("Pack Current: {:.2}A", self.snapshot.current);

        let advisory = state_advisory(self.outcome.state);
        if self.outcome.state.is_latched() {
            tracing::error!("{}", advisory);
        } else if self.outcome.state == SystemState::Warning {
            tracing::warn!("{}", advisory);
        } else {
            tracing::info!("{}", advisory);
        }
        tracing::info!("{}", self.summary_line());
    }
}
