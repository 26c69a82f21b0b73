//! Concrete-curing controller library.
//!
//! Watches concrete-surface and ambient-air sensors, evaluates alarm
//! conditions and drives an irrigation pump and a water heater so a
//! freshly poured slab cures within its age-dependent humidity and
//! temperature envelope.  The core is I/O-free; the binary in
//! `main.rs` plugs in the adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alarms;
pub mod app;
pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod policy;
pub mod store;
