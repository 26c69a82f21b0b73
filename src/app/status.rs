//! Read-only status snapshot for dashboards and the status file.

use serde::Serialize;

use crate::alarms::Alarm;
use crate::policy::CuringTargets;
use crate::store::{Device, HeaterState, PumpState, ReadingStore, SensorReading};

/// A device error as last reported by the device itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceErrorReport {
    pub device: Device,
    pub error: String,
    pub timestamp_ms: i64,
}

/// Everything a dashboard needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub now_ms: i64,
    pub simulated: bool,
    pub step_minutes: u32,
    pub concrete_age_hours: i64,
    pub targets: CuringTargets,
    pub concrete: SensorReading,
    pub ambient: SensorReading,
    pub pump: PumpState,
    /// Live countdown of the current pump run.
    pub pump_minutes_left: u32,
    pub heater: HeaterState,
    pub device_errors: Vec<DeviceErrorReport>,
    pub tick_count: u64,
}

impl StatusReport {
    pub(crate) fn device_errors(store: &ReadingStore) -> Vec<DeviceErrorReport> {
        Device::ALL
            .into_iter()
            .filter_map(|device| {
                store.device_error(device).map(|(text, ts)| DeviceErrorReport {
                    device,
                    error: text.to_owned(),
                    timestamp_ms: ts,
                })
            })
            .collect()
    }
}

/// The document written by the status-file adapter.
#[derive(Debug, Serialize)]
pub struct StatusDocument<'a> {
    pub status: &'a StatusReport,
    pub alarms: &'a [Alarm],
}
