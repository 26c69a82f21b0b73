//! Application core: curing rules behind port traits, zero I/O.
//!
//! This module wires the clock, reading store, alarm engine and decision
//! engine into one [`service::Controller`].  All interaction with the
//! outside world happens through the **port traits** in [`ports`], which
//! keeps the core testable without a broker, files or a terminal.

pub mod events;
pub mod ingest;
pub mod ports;
pub mod service;
pub mod shared;
pub mod status;
