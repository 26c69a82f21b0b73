//! Last-known values for every device the controller watches or drives.
//!
//! The store is the "blackboard" shared by ingestion and the decision
//! tick: ingestion writes sensor/battery/error readings into it at any
//! time, and the tick reads a consistent copy ([`ReadingStore::clone`])
//! before deciding.  Actuator fields (`active`, durations, targets) are
//! written only by the decision engine.

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::clock::MS_PER_MINUTE;
use crate::error::IngestError;

/// Longest device error text kept; longer texts are truncated.
pub const ERROR_TEXT_CAPACITY: usize = 64;

pub type ErrorText = heapless::String<ERROR_TEXT_CAPACITY>;

/// Copy `text` into a bounded string, cutting at a char boundary.
pub fn error_text(text: &str) -> ErrorText {
    let mut out = ErrorText::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Device / metric identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Concrete,
    Ambient,
    Pump,
    Heater,
}

impl Device {
    pub const ALL: [Device; 4] = [Device::Concrete, Device::Ambient, Device::Pump, Device::Heater];

    pub fn name(self) -> &'static str {
        match self {
            Self::Concrete => "concrete",
            Self::Ambient => "ambient",
            Self::Pump => "pump",
            Self::Heater => "heater",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Device {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Device::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| IngestError::UnknownTopic(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Battery,
    Error,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Temperature, Metric::Humidity, Metric::Battery, Metric::Error];

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Battery => "battery",
            Self::Error => "error",
        }
    }
}

impl FromStr for Metric {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| IngestError::UnknownTopic(s.to_owned()))
    }
}

/// A decoded, range-checked value.  The core never sees raw payload text.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Temperature(f32),
    Humidity(f32),
    Battery(u8),
    /// `None` clears a previously reported error.
    Error(Option<ErrorText>),
}

impl Reading {
    pub fn metric(&self) -> Metric {
        match self {
            Self::Temperature(_) => Metric::Temperature,
            Self::Humidity(_) => Metric::Humidity,
            Self::Battery(_) => Metric::Battery,
            Self::Error(_) => Metric::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Device state
// ---------------------------------------------------------------------------

/// Concrete-surface or ambient-air sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub temperature: f32,
    pub humidity: f32,
    pub battery: u8,
    pub last_update_ms: i64,
    pub error_text: Option<ErrorText>,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            battery: 100,
            last_update_ms: 0,
            error_text: None,
        }
    }
}

/// Irrigation pump/valve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpState {
    pub active: bool,
    pub planned_duration_minutes: u32,
    /// Run time granted at activation; 0 while off.
    pub remaining_minutes: u32,
    pub last_activation_ms: i64,
    /// 0 until the pump has been switched off at least once.
    pub last_deactivation_ms: i64,
    pub battery: u8,
    pub last_update_ms: i64,
    pub error_text: Option<ErrorText>,
}

impl Default for PumpState {
    fn default() -> Self {
        Self {
            active: false,
            planned_duration_minutes: 0,
            remaining_minutes: 0,
            last_activation_ms: 0,
            last_deactivation_ms: 0,
            battery: 100,
            last_update_ms: 0,
            error_text: None,
        }
    }
}

impl PumpState {
    /// Whole minutes since activation; 0 while off.
    pub fn elapsed_minutes(&self, now_ms: i64) -> i64 {
        if self.active {
            ((now_ms - self.last_activation_ms) / MS_PER_MINUTE).max(0)
        } else {
            0
        }
    }

    /// Live countdown of the granted run time.
    pub fn minutes_left(&self, now_ms: i64) -> u32 {
        let left = i64::from(self.remaining_minutes) - self.elapsed_minutes(now_ms);
        left.clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Irrigation water heater.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaterState {
    pub active: bool,
    /// Setpoint (°C); always 0 while off.
    pub target_temperature: f32,
    pub battery: u8,
    pub last_update_ms: i64,
    pub error_text: Option<ErrorText>,
}

impl Default for HeaterState {
    fn default() -> Self {
        Self {
            active: false,
            target_temperature: 0.0,
            battery: 100,
            last_update_ms: 0,
            error_text: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ReadingStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadingStore {
    pub concrete: SensorReading,
    pub ambient: SensorReading,
    pub pump: PumpState,
    pub heater: HeaterState,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one decoded reading.
    ///
    /// Actuators report only battery and error; anything else is rejected
    /// and leaves the store untouched.
    pub fn apply(&mut self, device: Device, reading: &Reading, timestamp_ms: i64) -> Result<(), IngestError> {
        match device {
            Device::Concrete => apply_sensor(&mut self.concrete, reading, timestamp_ms),
            Device::Ambient => apply_sensor(&mut self.ambient, reading, timestamp_ms),
            Device::Pump => {
                let p = &mut self.pump;
                apply_actuator(device, &mut p.battery, &mut p.error_text, &mut p.last_update_ms, reading, timestamp_ms)
            }
            Device::Heater => {
                let h = &mut self.heater;
                apply_actuator(device, &mut h.battery, &mut h.error_text, &mut h.last_update_ms, reading, timestamp_ms)
            }
        }
    }

    /// Both climate sensors have reported at least once since startup.
    pub fn climate_reported(&self) -> bool {
        self.concrete.last_update_ms != 0 && self.ambient.last_update_ms != 0
    }

    pub fn battery(&self, device: Device) -> u8 {
        match device {
            Device::Concrete => self.concrete.battery,
            Device::Ambient => self.ambient.battery,
            Device::Pump => self.pump.battery,
            Device::Heater => self.heater.battery,
        }
    }

    /// Latest error text reported by `device`, with its update time.
    pub fn device_error(&self, device: Device) -> Option<(&str, i64)> {
        let (text, ts) = match device {
            Device::Concrete => (&self.concrete.error_text, self.concrete.last_update_ms),
            Device::Ambient => (&self.ambient.error_text, self.ambient.last_update_ms),
            Device::Pump => (&self.pump.error_text, self.pump.last_update_ms),
            Device::Heater => (&self.heater.error_text, self.heater.last_update_ms),
        };
        text.as_deref().map(|t| (t, ts))
    }
}

fn apply_sensor(sensor: &mut SensorReading, reading: &Reading, ts: i64) -> Result<(), IngestError> {
    match reading {
        Reading::Temperature(t) => sensor.temperature = *t,
        Reading::Humidity(h) => sensor.humidity = *h,
        Reading::Battery(b) => sensor.battery = *b,
        Reading::Error(text) => sensor.error_text.clone_from(text),
    }
    sensor.last_update_ms = ts;
    Ok(())
}

fn apply_actuator(
    device: Device,
    battery: &mut u8,
    error: &mut Option<ErrorText>,
    last_update: &mut i64,
    reading: &Reading,
    ts: i64,
) -> Result<(), IngestError> {
    match reading {
        Reading::Battery(b) => *battery = *b,
        Reading::Error(text) => error.clone_from(text),
        other => {
            return Err(IngestError::Unsupported {
                device: device.name(),
                metric: other.metric().name(),
            });
        }
    }
    *last_update = ts;
    Ok(())
}
