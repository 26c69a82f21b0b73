//! Controller configuration parameters
//!
//! All tunable parameters for the curing controller.  Values can be
//! overridden from a JSON file (see [`crate::adapters::config_file`]);
//! anything missing from the file falls back to [`Default`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the heater decision relates to the pump decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaterCoupling {
    /// Pre-warm only when the pump triggers in the same tick.
    #[default]
    PumpAware,
    /// Pre-warm whenever the air is cold, regardless of the pump.
    Independent,
}

/// Thresholds and timing limits consulted by the alarm and decision engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLimits {
    // --- Pump ---
    /// Guard: the pump may not be (re)armed once it has run this long.
    pub max_pump_run_minutes: u32,
    /// Cool-down after a deactivation before the pump may start again.
    pub min_pump_pause_minutes: u32,
    /// Below this ambient temperature irrigation is blocked (freezing risk).
    pub min_air_temp_for_pump_c: f32,
    /// Ambient humidity below which the surface dries too fast.
    pub dry_air_humidity_percent: f32,
    /// Irrigation run when the humidity deficit is small.
    pub short_run_minutes: u32,
    /// Irrigation run when the humidity deficit is large.
    pub long_run_minutes: u32,
    /// Deficit (target − measured, %) at which the long run is chosen.
    pub long_run_deficit_percent: f32,

    // --- Heater ---
    /// Concrete below this temperature needs heating.
    pub min_concrete_temp_c: f32,
    /// Heater setpoint above `min_concrete_temp_c` when heating concrete.
    pub heating_margin_c: f32,
    /// Ambient temperature below which irrigation water is pre-warmed.
    pub min_air_temp_for_heating_c: f32,
    /// Heater setpoint when pre-warming irrigation water.
    pub prewarm_target_c: f32,

    // --- Cooling / alarms ---
    /// Concrete above this temperature is cooled by irrigation.
    pub max_concrete_temp_c: f32,
    pub critical_min_temp_c: f32,
    pub critical_max_temp_c: f32,
    /// Battery percentage below which an INFO alarm is raised.
    pub low_battery_percent: u8,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            max_pump_run_minutes: 30,
            min_pump_pause_minutes: 15,
            min_air_temp_for_pump_c: 2.0,
            dry_air_humidity_percent: 50.0,
            short_run_minutes: 300,
            long_run_minutes: 600,
            long_run_deficit_percent: 20.0,

            min_concrete_temp_c: 5.0,
            heating_margin_c: 5.0,
            min_air_temp_for_heating_c: 10.0,
            prewarm_target_c: 25.0,

            max_concrete_temp_c: 35.0,
            critical_min_temp_c: 0.0,
            critical_max_temp_c: 40.0,
            low_battery_percent: 20,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Decision tick interval (milliseconds)
    pub tick_interval_ms: u64,
    /// First segment of every transport topic, e.g. `slab1/concrete/temperature`
    pub topic_prefix: String,
    /// Simulated-time feed file; `None` runs on the wall clock
    pub time_feed_path: Option<PathBuf>,
    /// Where to write the status/alarm JSON each tick; `None` disables it
    pub status_path: Option<PathBuf>,
    pub heater_coupling: HeaterCoupling,
    pub limits: ControlLimits,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            topic_prefix: "slab1".into(),
            time_feed_path: Some(PathBuf::from("time.json")),
            status_path: None,
            heater_coupling: HeaterCoupling::PumpAware,
            limits: ControlLimits::default(),
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.topic_prefix.is_empty() || self.topic_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationFailed(
                "topic_prefix must be non-empty without whitespace",
            ));
        }
        if l.short_run_minutes == 0 || l.short_run_minutes > l.long_run_minutes {
            return Err(ConfigError::ValidationFailed(
                "short_run_minutes must be in 1..=long_run_minutes",
            ));
        }
        if l.critical_min_temp_c >= l.critical_max_temp_c {
            return Err(ConfigError::ValidationFailed(
                "critical_min_temp_c must be below critical_max_temp_c",
            ));
        }
        if l.min_concrete_temp_c >= l.max_concrete_temp_c {
            return Err(ConfigError::ValidationFailed(
                "min_concrete_temp_c must be below max_concrete_temp_c",
            ));
        }
        if l.low_battery_percent > 100 {
            return Err(ConfigError::ValidationFailed("low_battery_percent must be <= 100"));
        }
        if !(0.0..=100.0).contains(&l.dry_air_humidity_percent) {
            return Err(ConfigError::ValidationFailed(
                "dry_air_humidity_percent must be within 0..=100",
            ));
        }
        let temps = [
            l.min_air_temp_for_pump_c,
            l.min_air_temp_for_heating_c,
            l.prewarm_target_c,
            l.heating_margin_c,
            l.long_run_deficit_percent,
        ];
        if temps.iter().any(|t| !t.is_finite()) {
            return Err(ConfigError::ValidationFailed("thresholds must be finite"));
        }
        Ok(())
    }
}
