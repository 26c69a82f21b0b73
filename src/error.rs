//! Unified error types for the curing controller.
//!
//! Every fallible edge of the core (ingestion, outbound commands, the
//! simulated-time feed, configuration) has its own small enum.  All of
//! them are recoverable: the control loop logs them and keeps ticking.

use core::fmt;

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Why an inbound reading was rejected.  The prior value is always kept.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Topic or device/metric name not recognised.
    UnknownTopic(String),
    /// Payload is not a finite number.
    Malformed(String),
    /// Number parsed but lies outside the physically plausible range.
    OutOfRange { metric: &'static str, value: f32 },
    /// The device does not report this metric (e.g. pump humidity).
    Unsupported {
        device: &'static str,
        metric: &'static str,
    },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic(t) => write!(f, "unknown topic '{t}'"),
            Self::Malformed(p) => write!(f, "malformed payload '{p}'"),
            Self::OutOfRange { metric, value } => {
                write!(f, "{metric} value {value} out of range")
            }
            Self::Unsupported { device, metric } => {
                write!(f, "{device} does not report {metric}")
            }
        }
    }
}

impl std::error::Error for IngestError {}

// ---------------------------------------------------------------------------
// Outbound command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The transport could not deliver the command.
    TransportUnavailable(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportUnavailable(why) => write!(f, "transport unavailable: {why}"),
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Simulated-time feed errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFeedError {
    /// The feed source could not be read (missing file, permissions, ...).
    Unavailable(String),
    /// The feed was read but is not a valid record.
    Corrupted(String),
    /// `date` / `time` fields did not parse.
    InvalidTimestamp { date: String, time: String },
}

impl fmt::Display for TimeFeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "unavailable: {why}"),
            Self::Corrupted(why) => write!(f, "corrupted: {why}"),
            Self::InvalidTimestamp { date, time } => {
                write!(f, "invalid timestamp '{date} {time}'")
            }
        }
    }
}

impl std::error::Error for TimeFeedError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted(String),
    /// A field failed range validation; names the field and the rule.
    ValidationFailed(&'static str),
    /// Generic I/O error from the backing store.
    IoError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(why) => write!(f, "config corrupted: {why}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError(why) => write!(f, "I/O error: {why}"),
        }
    }
}

impl std::error::Error for ConfigError {}
