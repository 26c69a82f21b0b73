//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log a line, write a status file,
//! forward to a dashboard.

use crate::alarms::Alarm;
use crate::control::ActuatorCommand;
use crate::error::CommandError;

use super::status::StatusReport;

/// Structured events emitted by the controller core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Per-tick status snapshot.
    Telemetry(Box<StatusReport>),

    /// An alarm condition held during this tick.
    AlarmRaised(Alarm),

    /// Pump transitioned; `duration_minutes` is 0 when switched off.
    PumpSwitched { active: bool, duration_minutes: u32 },

    /// Heater transitioned; `target_c` is 0 when switched off.
    HeaterSwitched { active: bool, target_c: f32 },

    /// A command could not be delivered.  The transition stands.
    CommandFailed {
        command: ActuatorCommand,
        error: CommandError,
    },

    /// The first simulated instant was seen and fixed as the pour time.
    PourAnchored { anchor_ms: i64 },

    /// The controller ran its first tick.
    Started { now_ms: i64, simulated: bool },
}
