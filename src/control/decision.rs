//! Actuator decision engine.
//!
//! One tick is a single transactional step over two coupled actuators:
//!
//! ```text
//!   pre-tick snapshot ──▶ Conditions ──▶ pump trigger ──┐
//!                               │                        ▼
//!                               └──────────────▶ heater wanted
//!                                                        │
//!                        Decision { pump?, heater? } ◀───┘
//!                                  │
//!                      apply ──▶ ReadingStore + ActuatorCommand list
//! ```
//!
//! Both transitions are computed from the same snapshot **before** either
//! is applied, so the heater's pre-warm rule sees "pump is about to run"
//! and never the pump's post-tick state.
//!
//! ```text
//!  Pump    OFF ──[trigger ∧ can_activate]──▶ ON
//!          ON  ──[elapsed ≥ granted]───────▶ OFF
//!          ON  ──[no condition holds]──────▶ OFF
//!
//!  Heater  OFF ──[concrete cold ∨ (air cold ∧ pump trigger)]──▶ ON
//!          ON  ──[neither]──────────────────────────────────────▶ OFF
//! ```

use log::{debug, info};

use crate::clock::MS_PER_MINUTE;
use crate::config::{ControlLimits, HeaterCoupling};
use crate::policy::CuringTargets;
use crate::store::ReadingStore;

// ---------------------------------------------------------------------------
// Decision types
// ---------------------------------------------------------------------------

/// Boolean view of the snapshot the rules are written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conditions {
    /// Concrete humidity below the age target.
    pub needs_water: bool,
    /// Ambient humidity below the dry-air threshold.
    pub air_dry: bool,
    /// Concrete too hot; irrigation cools it.
    pub needs_cooling: bool,
    /// Concrete too cold; heater must run.
    pub needs_heating: bool,
    /// Ambient too cold for unheated irrigation water.
    pub air_cold: bool,
}

impl Conditions {
    /// Any reason to irrigate.
    pub fn wants_water(&self) -> bool {
        self.needs_water || self.air_dry || self.needs_cooling
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStopReason {
    DurationElapsed,
    NoLongerNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpTransition {
    Activate { duration_minutes: u32 },
    Deactivate(PumpStopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatReason {
    ConcreteCold,
    PrewarmIrrigation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaterTransition {
    Activate { target_c: f32, reason: HeatReason },
    Deactivate,
}

/// Outcome of one evaluation.  `None` means "stay as you are".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub conditions: Conditions,
    /// Same-tick pump trigger, as consulted by the heater rule.
    pub pump_triggered: bool,
    pub pump: Option<PumpTransition>,
    pub heater: Option<HeaterTransition>,
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        self.pump.is_none() && self.heater.is_none()
    }
}

/// What must be sent to the actuators after a decision is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCommand {
    Pump { active: bool, duration_minutes: u32 },
    Heater { active: bool, target_c: f32 },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DecisionEngine {
    limits: ControlLimits,
    coupling: HeaterCoupling,
}

impl DecisionEngine {
    pub fn new(limits: ControlLimits, coupling: HeaterCoupling) -> Self {
        Self { limits, coupling }
    }

    pub fn conditions(&self, snap: &ReadingStore, targets: CuringTargets) -> Conditions {
        let l = &self.limits;
        Conditions {
            needs_water: snap.concrete.humidity < targets.target_humidity,
            air_dry: snap.ambient.humidity < l.dry_air_humidity_percent,
            needs_cooling: snap.concrete.temperature > l.max_concrete_temp_c,
            needs_heating: snap.concrete.temperature < l.min_concrete_temp_c,
            air_cold: snap.ambient.temperature < l.min_air_temp_for_heating_c,
        }
    }

    /// Hysteresis guard for starting the pump.
    pub fn can_activate_pump(&self, snap: &ReadingStore, now_ms: i64) -> bool {
        let l = &self.limits;
        let pump = &snap.pump;

        if snap.ambient.temperature < l.min_air_temp_for_pump_c {
            return false;
        }

        if pump.last_deactivation_ms > 0
            && now_ms - pump.last_deactivation_ms < i64::from(l.min_pump_pause_minutes) * MS_PER_MINUTE
        {
            return false;
        }

        if pump.active && pump.elapsed_minutes(now_ms) >= i64::from(l.max_pump_run_minutes) {
            return false;
        }

        true
    }

    /// Run time to grant on activation, from the humidity deficit.
    pub fn pump_duration(&self, snap: &ReadingStore, targets: CuringTargets) -> u32 {
        let deficit = targets.target_humidity - snap.concrete.humidity;
        if deficit >= self.limits.long_run_deficit_percent {
            self.limits.long_run_minutes
        } else {
            self.limits.short_run_minutes
        }
    }

    /// Evaluate both actuators against one immutable snapshot.  Pure.
    pub fn decide(&self, snap: &ReadingStore, targets: CuringTargets, now_ms: i64) -> Decision {
        let conditions = self.conditions(snap, targets);
        let pump_triggered = conditions.wants_water() && self.can_activate_pump(snap, now_ms);

        let pump = if snap.pump.active {
            let elapsed = snap.pump.elapsed_minutes(now_ms);
            if elapsed >= i64::from(snap.pump.remaining_minutes) {
                Some(PumpTransition::Deactivate(PumpStopReason::DurationElapsed))
            } else if !conditions.wants_water() {
                Some(PumpTransition::Deactivate(PumpStopReason::NoLongerNeeded))
            } else {
                None
            }
        } else if pump_triggered {
            Some(PumpTransition::Activate {
                duration_minutes: self.pump_duration(snap, targets),
            })
        } else {
            None
        };

        let prewarm = match self.coupling {
            HeaterCoupling::PumpAware => conditions.air_cold && pump_triggered,
            HeaterCoupling::Independent => conditions.air_cold,
        };
        let heater_wanted = conditions.needs_heating || prewarm;

        let heater = match (snap.heater.active, heater_wanted) {
            (false, true) => Some(if conditions.needs_heating {
                HeaterTransition::Activate {
                    target_c: self.limits.min_concrete_temp_c + self.limits.heating_margin_c,
                    reason: HeatReason::ConcreteCold,
                }
            } else {
                HeaterTransition::Activate {
                    target_c: self.limits.prewarm_target_c,
                    reason: HeatReason::PrewarmIrrigation,
                }
            }),
            (true, false) => Some(HeaterTransition::Deactivate),
            _ => None,
        };

        Decision {
            conditions,
            pump_triggered,
            pump,
            heater,
        }
    }

    /// Write `decision` into the store and list the commands it implies,
    /// heater first, then pump.
    pub fn apply(&self, decision: &Decision, store: &mut ReadingStore, now_ms: i64) -> Vec<ActuatorCommand> {
        let mut commands = Vec::with_capacity(2);

        match decision.heater {
            Some(HeaterTransition::Activate { target_c, reason }) => {
                store.heater.active = true;
                store.heater.target_temperature = target_c;
                info!("Heater ON ({reason:?}, target {target_c:.1}°C)");
                commands.push(ActuatorCommand::Heater { active: true, target_c });
            }
            Some(HeaterTransition::Deactivate) => {
                store.heater.active = false;
                store.heater.target_temperature = 0.0;
                info!("Heater OFF");
                commands.push(ActuatorCommand::Heater {
                    active: false,
                    target_c: 0.0,
                });
            }
            None => {}
        }

        match decision.pump {
            Some(PumpTransition::Activate { duration_minutes }) => {
                let c = &decision.conditions;
                info!(
                    "Pump ON for {duration_minutes} min (dry concrete={}, dry air={}, cooling={})",
                    c.needs_water, c.air_dry, c.needs_cooling
                );
                let pump = &mut store.pump;
                pump.active = true;
                pump.planned_duration_minutes = duration_minutes;
                pump.remaining_minutes = duration_minutes;
                pump.last_activation_ms = now_ms;
                commands.push(ActuatorCommand::Pump {
                    active: true,
                    duration_minutes,
                });
            }
            Some(PumpTransition::Deactivate(reason)) => {
                let pump = &mut store.pump;
                info!(
                    "Pump OFF ({reason:?}) after {} of {} min",
                    pump.elapsed_minutes(now_ms),
                    pump.remaining_minutes
                );
                pump.active = false;
                pump.remaining_minutes = 0;
                pump.last_deactivation_ms = now_ms;
                commands.push(ActuatorCommand::Pump {
                    active: false,
                    duration_minutes: 0,
                });
            }
            None => {
                if store.pump.active {
                    debug!("Pump running, {} min left", store.pump.minutes_left(now_ms));
                }
            }
        }

        commands
    }
}
