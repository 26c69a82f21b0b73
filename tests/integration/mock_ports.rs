//! Mock port adapters for integration tests.
//!
//! Records every command and event so tests can assert on the full
//! history, and lets tests move simulated time explicitly.

use chrono::DateTime;
use curectl::app::events::AppEvent;
use curectl::app::ports::{CommandPort, EventSink, TimeFeedPort};
use curectl::clock::{MS_PER_MINUTE, TimeFeed};
use curectl::error::{CommandError, TimeFeedError};

// ── Command record ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CommandCall {
    Pump { active: bool, duration_minutes: u32 },
    Heater { active: bool, target_c: f32 },
}

// ── MockCommands ──────────────────────────────────────────────

pub struct MockCommands {
    pub calls: Vec<CommandCall>,
    /// When set, every call is recorded and then refused.
    pub offline: bool,
}

#[allow(dead_code)]
impl MockCommands {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            calls: Vec::new(),
            offline: true,
        }
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                CommandCall::Pump { active, .. } => Some(*active),
                CommandCall::Heater { .. } => None,
            })
            .unwrap_or(false)
    }

    pub fn heater_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                CommandCall::Heater { active, .. } => Some(*active),
                CommandCall::Pump { .. } => None,
            })
            .unwrap_or(false)
    }

    fn result(&self) -> Result<(), CommandError> {
        if self.offline {
            Err(CommandError::TransportUnavailable("broker down".into()))
        } else {
            Ok(())
        }
    }
}

impl CommandPort for MockCommands {
    fn set_pump(&mut self, active: bool, duration_minutes: u32) -> Result<(), CommandError> {
        self.calls.push(CommandCall::Pump {
            active,
            duration_minutes,
        });
        self.result()
    }

    fn set_heater(&mut self, active: bool, target_c: f32) -> Result<(), CommandError> {
        self.calls.push(CommandCall::Heater { active, target_c });
        self.result()
    }
}

// ── SimClock (TimeFeedPort) ───────────────────────────────────

/// Simulated-time feed the test advances by hand.
pub struct SimClock {
    pub now_ms: Option<i64>,
    pub step_minutes: u32,
    pub broken: bool,
}

#[allow(dead_code)]
impl SimClock {
    /// Starts at 2025-05-05 12:00:00 UTC.
    pub fn start() -> Self {
        Self {
            now_ms: Some(1_746_446_400_000),
            step_minutes: 10,
            broken: false,
        }
    }

    pub fn wall_clock() -> Self {
        Self {
            now_ms: None,
            step_minutes: 10,
            broken: false,
        }
    }

    pub fn advance_minutes(&mut self, minutes: i64) {
        if let Some(now) = self.now_ms.as_mut() {
            *now += minutes * MS_PER_MINUTE;
        }
    }

    pub fn now(&self) -> i64 {
        self.now_ms.unwrap_or_default()
    }
}

impl TimeFeedPort for SimClock {
    fn read(&mut self) -> Result<Option<TimeFeed>, TimeFeedError> {
        if self.broken {
            return Err(TimeFeedError::Unavailable("feed file locked".into()));
        }
        let Some(ms) = self.now_ms else {
            return Ok(None);
        };
        let dt = DateTime::from_timestamp_millis(ms).ok_or_else(|| TimeFeedError::Corrupted(ms.to_string()))?;
        Ok(Some(TimeFeed {
            date: dt.format("%Y-%m-%d").to_string(),
            time: dt.format("%H:%M:%S").to_string(),
            step_minutes: self.step_minutes,
        }))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
