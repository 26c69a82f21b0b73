//! Actuator control: the coupled pump/heater decision engine.

pub mod decision;

pub use decision::{ActuatorCommand, Decision, DecisionEngine};
