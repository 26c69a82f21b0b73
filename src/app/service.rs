//! Application service, the hexagonal core.
//!
//! [`Controller`] owns the clock, the reading store, the alarm log and
//! both engines.  It exposes a hardware-agnostic API; all I/O flows
//! through port traits injected at call sites, so the whole service is
//! testable with mock adapters.
//!
//! ```text
//!  IngestUpdate ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │          Controller          │
//!  TimeFeedPort ──▶ │ Clock · Alarms · Decisions   │ ──▶ CommandPort
//!                   └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::alarms::{Alarm, AlarmEngine, AlarmLog};
use crate::clock::{ClockRefresh, ClockSource, FeedRead};
use crate::config::ControllerConfig;
use crate::control::{ActuatorCommand, DecisionEngine};
use crate::error::{IngestError, TimeFeedError};
use crate::policy::{CuringTargets, targets_for_age};
use crate::store::ReadingStore;

use super::events::AppEvent;
use super::ingest::IngestUpdate;
use super::ports::{CommandPort, EventSink, TimeFeedPort};
use super::status::StatusReport;

/// Summary of one [`Controller::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub now_ms: i64,
    pub concrete_age_hours: i64,
    pub targets: CuringTargets,
    pub alarms_raised: usize,
    /// Commands implied by this tick's transitions, in send order.
    pub commands: Vec<ActuatorCommand>,
    /// How many of `commands` the transport refused.
    pub failed_commands: usize,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    clock: ClockSource,
    store: ReadingStore,
    alarm_engine: AlarmEngine,
    alarms: AlarmLog,
    decisions: DecisionEngine,
    tick_count: u64,
}

impl Controller {
    /// Construct from configuration, running on the system wall clock
    /// until a time feed says otherwise.
    pub fn new(config: &ControllerConfig) -> Self {
        Self::with_clock(config, ClockSource::new())
    }

    pub fn with_clock(config: &ControllerConfig, clock: ClockSource) -> Self {
        Self {
            clock,
            store: ReadingStore::new(),
            alarm_engine: AlarmEngine::new(&config.limits),
            alarms: AlarmLog::new(),
            decisions: DecisionEngine::new(config.limits.clone(), config.heater_coupling),
            tick_count: 0,
        }
    }

    // ── Ingestion ─────────────────────────────────────────────

    /// Store one decoded reading.  Rejections leave the prior value intact.
    pub fn ingest(&mut self, update: &IngestUpdate) -> Result<(), IngestError> {
        self.store
            .apply(update.device, &update.reading, update.timestamp_ms)
            .inspect_err(|e| warn!("Rejected {} reading: {e}", update.device))
    }

    // ── Clock ─────────────────────────────────────────────────

    /// Poll the time feed.  Errors are logged and returned; the previous
    /// time basis stays in effect.
    pub fn refresh_clock(
        &mut self,
        feed: &mut impl TimeFeedPort,
        sink: &mut impl EventSink,
    ) -> Result<ClockRefresh, TimeFeedError> {
        self.refresh_clock_from(feed.read(), sink)
    }

    /// As [`Self::refresh_clock`], for a feed already read by the caller.
    pub fn refresh_clock_from(
        &mut self,
        read: FeedRead,
        sink: &mut impl EventSink,
    ) -> Result<ClockRefresh, TimeFeedError> {
        let refresh = self
            .clock
            .apply_feed(read)
            .inspect_err(|e| warn!("Time feed {e}; keeping previous time basis"))?;
        if let ClockRefresh::Simulated { now_ms, anchored: true, .. } = refresh {
            sink.emit(&AppEvent::PourAnchored { anchor_ms: now_ms });
        }
        Ok(refresh)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: clock → alarms → decide → apply → send.
    ///
    /// Alarms and decisions both see the same pre-tick snapshot.  Command
    /// failures are reported but never roll back the applied transition.
    /// Until both climate sensors have reported, alarms run but no
    /// actuator is touched.
    pub fn tick(
        &mut self,
        feed: &mut impl TimeFeedPort,
        out: &mut impl CommandPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.tick_from(feed.read(), out, sink)
    }

    /// As [`Self::tick`], for a feed already read by the caller.
    pub fn tick_from(
        &mut self,
        read: FeedRead,
        out: &mut impl CommandPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        // 1. Clock
        let _ = self.refresh_clock_from(read, sink);
        let now_ms = self.clock.now();
        let concrete_age_hours = self.clock.concrete_age_hours();
        let targets = targets_for_age(concrete_age_hours);

        if self.tick_count == 0 {
            sink.emit(&AppEvent::Started {
                now_ms,
                simulated: self.clock.is_simulated(),
            });
            info!("Controller started (simulated={})", self.clock.is_simulated());
        }
        self.tick_count += 1;

        let snapshot = self.store.clone();

        // 2. Alarms
        let raised = self.alarm_engine.evaluate(&snapshot, targets, now_ms);
        let alarms_raised = raised.len();
        for alarm in raised {
            sink.emit(&AppEvent::AlarmRaised(alarm.clone()));
            self.alarms.push(alarm);
        }

        // 3. Decide, 4. apply
        let commands = if snapshot.climate_reported() {
            let decision = self.decisions.decide(&snapshot, targets, now_ms);
            self.decisions.apply(&decision, &mut self.store, now_ms)
        } else {
            debug!("Waiting for first concrete and ambient readings");
            Vec::new()
        };

        // 5. Send
        let mut failed_commands = 0;
        for command in &commands {
            let sent = match *command {
                ActuatorCommand::Heater { active, target_c } => out.set_heater(active, target_c),
                ActuatorCommand::Pump {
                    active,
                    duration_minutes,
                } => out.set_pump(active, duration_minutes),
            };
            match sent {
                Ok(()) => sink.emit(&switched_event(command)),
                Err(error) => {
                    failed_commands += 1;
                    warn!("Command {command:?} not delivered: {error}");
                    sink.emit(&AppEvent::CommandFailed {
                        command: *command,
                        error,
                    });
                }
            }
        }

        debug!(
            "Tick {} | age={}h | target RH {:.0}% | max ΔT {:.0}°C | alarms={} | commands={}",
            self.tick_count,
            concrete_age_hours,
            targets.target_humidity,
            targets.max_temp_diff,
            alarms_raised,
            commands.len()
        );
        sink.emit(&AppEvent::Telemetry(Box::new(self.status())));

        TickOutcome {
            now_ms,
            concrete_age_hours,
            targets,
            alarms_raised,
            commands,
            failed_commands,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusReport {
        let now_ms = self.clock.now();
        let age = self.clock.concrete_age_hours();
        StatusReport {
            now_ms,
            simulated: self.clock.is_simulated(),
            step_minutes: self.clock.state().step_minutes,
            concrete_age_hours: age,
            targets: targets_for_age(age),
            concrete: self.store.concrete.clone(),
            ambient: self.store.ambient.clone(),
            pump: self.store.pump.clone(),
            pump_minutes_left: self.store.pump.minutes_left(now_ms),
            heater: self.store.heater.clone(),
            device_errors: StatusReport::device_errors(&self.store),
            tick_count: self.tick_count,
        }
    }

    /// Full alarm history in insertion order.
    pub fn alarms(&self) -> &[Alarm] {
        self.alarms.entries()
    }

    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    pub fn clock(&self) -> &ClockSource {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn switched_event(command: &ActuatorCommand) -> AppEvent {
    match *command {
        ActuatorCommand::Pump {
            active,
            duration_minutes,
        } => AppEvent::PumpSwitched {
            active,
            duration_minutes,
        },
        ActuatorCommand::Heater { active, target_c } => AppEvent::HeaterSwitched { active, target_c },
    }
}
