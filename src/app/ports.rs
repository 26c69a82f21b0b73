//! Port traits: the hexagonal boundary between the controller core and the outside world.
//!
//! ```text
//!   transport ──▶ IngestUpdate ──▶ Controller ──▶ CommandPort ──▶ transport
//!                                      │  ▲
//!                           EventSink ◀┘  └── TimeFeedPort
//! ```
//!
//! Adapters (line transport, JSON files, log output) implement these
//! traits.  The [`Controller`](super::service::Controller) consumes them
//! via generics, so the core never touches files, sockets or stdout.

use crate::clock::TimeFeed;
use crate::config::ControllerConfig;
use crate::error::{CommandError, ConfigError, TimeFeedError};

// ───────────────────────────────────────────────────────────────
// Command port (driven adapter: core → actuators)
// ───────────────────────────────────────────────────────────────

/// Outbound actuator commands.  Called only on a state transition.
pub trait CommandPort {
    /// Switch the irrigation pump.  `duration_minutes` is 0 when stopping.
    fn set_pump(&mut self, active: bool, duration_minutes: u32) -> Result<(), CommandError>;

    /// Switch the water heater.  `target_c` is 0 when stopping.
    fn set_heater(&mut self, active: bool, target_c: f32) -> Result<(), CommandError>;
}

// ───────────────────────────────────────────────────────────────
// Simulated-time feed port
// ───────────────────────────────────────────────────────────────

/// Source of simulated time, polled once per tick.
pub trait TimeFeedPort {
    /// `Ok(None)` means no simulation is running; use the wall clock.
    fn read(&mut self) -> Result<Option<TimeFeed>, TimeFeedError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads controller configuration.
///
/// Implementations MUST run [`ControllerConfig::validate`] and reject
/// out-of-range values with [`ConfigError::ValidationFailed`] rather than
/// clamping them.
pub trait ConfigPort {
    /// Returns [`ControllerConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;
}
