//! Line-oriented transport: one `"<topic> <payload>"` message per line.
//!
//! This is the format `mosquitto_sub -v` prints and `mosquitto_pub -l`
//! style bridges consume, so a broker can be attached with a pipe:
//!
//! ```text
//!   mosquitto_sub -v -t 'slab1/#' | curectl | bridge-to-broker
//! ```
//!
//! Inbound lines feed the [`SharedController`]; outbound commands are
//! written by [`LineCommandPort`].

use std::io::{self, BufRead, Write};

use log::{debug, warn};

use super::topics::{DURATION, STATE, TARGET, TopicMap};
use crate::app::ports::CommandPort;
use crate::app::shared::SharedController;
use crate::error::{CommandError, IngestError};
use crate::store::{Device, Metric};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One routed inbound message, payload still raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundLine<'a> {
    pub device: Device,
    pub metric: Metric,
    pub payload: &'a str,
}

/// Split and route one line.  Blank lines and `#` comments yield `None`.
pub fn decode_line<'a>(topics: &TopicMap, line: &'a str) -> Result<Option<InboundLine<'a>>, IngestError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (topic, payload) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let (device, metric) = topics.route(topic)?;
    Ok(Some(InboundLine {
        device,
        metric,
        payload: payload.trim(),
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Feed every line of `reader` into `controller` until end of input.
///
/// Bad lines are logged and counted; only a read error stops the loop.
pub fn ingest_lines<R: BufRead>(reader: R, topics: &TopicMap, controller: &SharedController) -> io::Result<IngestStats> {
    let mut stats = IngestStats::default();
    for line in reader.lines() {
        let line = line?;
        let result = decode_line(topics, &line)
            .inspect_err(|e| warn!("Dropped line {line:?}: {e}"))
            .and_then(|inbound| match inbound {
                Some(m) => controller.ingest_payload(m.device, m.metric, m.payload).map(|()| true),
                None => Ok(false),
            });
        match result {
            Ok(true) => stats.accepted += 1,
            Ok(false) => {}
            Err(_) => stats.rejected += 1,
        }
    }
    debug!("Input closed ({} accepted, {} rejected)", stats.accepted, stats.rejected);
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Writes actuator commands as topic lines.
///
/// Each command is two lines, state first:
///
/// ```text
/// slab1/pump/state 1
/// slab1/pump/duration 300
/// ```
pub struct LineCommandPort<W: Write> {
    writer: W,
    topics: TopicMap,
}

impl<W: Write> LineCommandPort<W> {
    pub fn new(writer: W, topics: TopicMap) -> Self {
        Self { writer, topics }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn publish(&mut self, device: Device, pairs: [(&str, String); 2]) -> Result<(), CommandError> {
        let unavailable = |e: io::Error| CommandError::TransportUnavailable(e.to_string());
        for (field, payload) in pairs {
            writeln!(self.writer, "{} {payload}", self.topics.topic(device, field)).map_err(unavailable)?;
        }
        self.writer.flush().map_err(unavailable)
    }
}

impl<W: Write> CommandPort for LineCommandPort<W> {
    fn set_pump(&mut self, active: bool, duration_minutes: u32) -> Result<(), CommandError> {
        self.publish(
            Device::Pump,
            [(STATE, u8::from(active).to_string()), (DURATION, duration_minutes.to_string())],
        )
    }

    fn set_heater(&mut self, active: bool, target_c: f32) -> Result<(), CommandError> {
        self.publish(
            Device::Heater,
            [(STATE, u8::from(active).to_string()), (TARGET, format!("{target_c:.1}"))],
        )
    }
}
