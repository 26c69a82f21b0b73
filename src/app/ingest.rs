//! Inbound readings and the typed decode step in front of the core.
//!
//! Transports hand over `(device, metric, payload text, timestamp)`.
//! [`IngestUpdate::decode`] turns that into a range-checked [`Reading`]
//! or rejects it; nothing behind this point parses text.

use crate::error::IngestError;
use crate::store::{Device, Metric, Reading, error_text};

/// Sentinel payloads that clear a device error.
const CLEAR_ERROR: [&str; 4] = ["", "null", "none", "ok"];

/// One decoded reading addressed to one device.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestUpdate {
    pub device: Device,
    pub reading: Reading,
    pub timestamp_ms: i64,
}

impl IngestUpdate {
    pub fn new(device: Device, reading: Reading, timestamp_ms: i64) -> Self {
        Self {
            device,
            reading,
            timestamp_ms,
        }
    }

    /// Decode a raw payload.  Malformed or implausible values are rejected.
    pub fn decode(device: Device, metric: Metric, payload: &str, timestamp_ms: i64) -> Result<Self, IngestError> {
        let payload = payload.trim();
        let reading = match metric {
            Metric::Temperature => {
                let t = parse_number(payload)?;
                if !(-60.0..=100.0).contains(&t) {
                    return Err(IngestError::OutOfRange {
                        metric: metric.name(),
                        value: t,
                    });
                }
                Reading::Temperature(t)
            }
            Metric::Humidity => Reading::Humidity(parse_percent(metric, payload)?),
            Metric::Battery => Reading::Battery(parse_percent(metric, payload)?.round() as u8),
            Metric::Error => {
                let text = payload.trim_matches('"');
                if CLEAR_ERROR.iter().any(|c| text.eq_ignore_ascii_case(c)) {
                    Reading::Error(None)
                } else {
                    Reading::Error(Some(error_text(text)))
                }
            }
        };
        Ok(Self::new(device, reading, timestamp_ms))
    }
}

fn parse_number(payload: &str) -> Result<f32, IngestError> {
    payload
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::Malformed(payload.to_owned()))
}

fn parse_percent(metric: Metric, payload: &str) -> Result<f32, IngestError> {
    let v = parse_number(payload)?;
    if (0.0..=100.0).contains(&v) {
        Ok(v)
    } else {
        Err(IngestError::OutOfRange {
            metric: metric.name(),
            value: v,
        })
    }
}
