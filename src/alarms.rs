//! Alarm engine.
//!
//! Runs **every tick before the decision engine** and appends one
//! [`Alarm`] per condition that currently holds.  Alarms are plain
//! observations: evaluation never touches sensor or actuator state, and
//! a condition that persists is reported again on every tick.
//!
//! | Condition                                   | Level    |
//! |---------------------------------------------|----------|
//! | concrete temperature < critical minimum     | Critical |
//! | concrete temperature > critical maximum     | Critical |
//! | \|concrete − ambient\| > age-based max gap  | Warning  |
//! | concrete humidity < age-based target        | Warning  |
//! | any device battery below threshold          | Info     |

use core::fmt;

use log::{error, info, warn};
use serde::Serialize;

use crate::config::ControlLimits;
use crate::policy::CuringTargets;
use crate::store::{Device, ReadingStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Warning => f.write_str("WARNING"),
            Self::Critical => f.write_str("CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    pub level: AlarmLevel,
    pub message: String,
    pub timestamp_ms: i64,
}

/// Append-only alarm history, in insertion order.
// TODO: bound this (ring buffer or per-condition re-emission interval) once
// the status consumer can page through history.
#[derive(Debug, Default)]
pub struct AlarmLog {
    entries: Vec<Alarm>,
}

impl AlarmLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alarm: Alarm) {
        match alarm.level {
            AlarmLevel::Critical => error!("[{}] {}", alarm.level, alarm.message),
            AlarmLevel::Warning => warn!("[{}] {}", alarm.level, alarm.message),
            AlarmLevel::Info => info!("[{}] {}", alarm.level, alarm.message),
        }
        self.entries.push(alarm);
    }

    pub fn entries(&self) -> &[Alarm] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stateless evaluator; thresholds come from [`ControlLimits`].
pub struct AlarmEngine {
    critical_min_c: f32,
    critical_max_c: f32,
    low_battery: u8,
}

impl AlarmEngine {
    pub fn new(limits: &ControlLimits) -> Self {
        Self {
            critical_min_c: limits.critical_min_temp_c,
            critical_max_c: limits.critical_max_temp_c,
            low_battery: limits.low_battery_percent,
        }
    }

    /// Every alarm condition that holds for `store` right now.
    pub fn evaluate(&self, store: &ReadingStore, targets: CuringTargets, now_ms: i64) -> Vec<Alarm> {
        let mut raised = Vec::new();
        let mut raise = |level, message: String| {
            raised.push(Alarm {
                level,
                message,
                timestamp_ms: now_ms,
            });
        };

        // ── Critical temperatures ─────────────────────────────────
        let concrete_t = store.concrete.temperature;
        if concrete_t < self.critical_min_c {
            raise(
                AlarmLevel::Critical,
                format!(
                    "Concrete temperature below critical (< {:.0}°C): {:.1}°C",
                    self.critical_min_c, concrete_t
                ),
            );
        }
        if concrete_t > self.critical_max_c {
            raise(
                AlarmLevel::Critical,
                format!(
                    "Concrete temperature above critical (> {:.0}°C): {:.1}°C",
                    self.critical_max_c, concrete_t
                ),
            );
        }

        // ── Concrete / air gap ────────────────────────────────────
        let gap = (concrete_t - store.ambient.temperature).abs();
        if gap > targets.max_temp_diff {
            raise(
                AlarmLevel::Warning,
                format!(
                    "Temperature difference ({:.1}°C) exceeds allowed ({:.1}°C)",
                    gap, targets.max_temp_diff
                ),
            );
        }

        // ── Humidity ──────────────────────────────────────────────
        if store.concrete.humidity < targets.target_humidity {
            raise(
                AlarmLevel::Warning,
                format!(
                    "Concrete humidity ({:.1}%) below target ({:.1}%)",
                    store.concrete.humidity, targets.target_humidity
                ),
            );
        }

        // ── Batteries ─────────────────────────────────────────────
        for device in Device::ALL {
            let battery = store.battery(device);
            if battery < self.low_battery {
                raise(AlarmLevel::Info, format!("Low {device} battery: {battery}%"));
            }
        }

        raised
    }
}
