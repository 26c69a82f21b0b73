//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! log line.  Per-tick telemetry goes to `debug` so the default filter
//! shows only transitions, alarms and failures.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | age={}h | concrete T={:.1}\u{00b0}C RH={:.1}% | air T={:.1}\u{00b0}C RH={:.1}% | \
                     pump={} ({} min left) | heater={} ({:.1}\u{00b0}C) | errors={}",
                    t.concrete_age_hours,
                    t.concrete.temperature,
                    t.concrete.humidity,
                    t.ambient.temperature,
                    t.ambient.humidity,
                    if t.pump.active { "ON" } else { "OFF" },
                    t.pump_minutes_left,
                    if t.heater.active { "ON" } else { "OFF" },
                    t.heater.target_temperature,
                    t.device_errors.len(),
                );
            }
            // The alarm log already reports each alarm at its own level.
            AppEvent::AlarmRaised(alarm) => {
                debug!("ALARM | {} | {}", alarm.level, alarm.message);
            }
            AppEvent::PumpSwitched {
                active,
                duration_minutes,
            } => {
                info!("PUMP | active={active} duration={duration_minutes}min");
            }
            AppEvent::HeaterSwitched { active, target_c } => {
                info!("HEATER | active={active} target={target_c:.1}\u{00b0}C");
            }
            AppEvent::CommandFailed { command, error } => {
                warn!("COMMAND | {command:?} failed: {error}");
            }
            AppEvent::PourAnchored { anchor_ms } => {
                info!("CLOCK | pour anchored at {anchor_ms} ms");
            }
            AppEvent::Started { now_ms, simulated } => {
                info!("START | now={now_ms} simulated={simulated}");
            }
        }
    }
}
