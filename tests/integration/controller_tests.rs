//! Integration tests for the ingest → tick → command pipeline.
//!
//! These drive a [`Controller`] through simulated time with mock ports
//! and assert on the exact commands and events it produces.

use crate::mock_ports::{CommandCall, MockCommands, RecordingSink, SimClock};

use curectl::alarms::AlarmLevel;
use curectl::app::events::AppEvent;
use curectl::app::ingest::IngestUpdate;
use curectl::app::service::Controller;
use curectl::clock::ClockSource;
use curectl::config::{ControllerConfig, HeaterCoupling};
use curectl::error::TimeFeedError;
use curectl::store::{Device, Metric};

const WALL_MS: i64 = 1_700_000_000_000;

fn make_with(config: &ControllerConfig) -> (Controller, SimClock, MockCommands, RecordingSink) {
    let controller = Controller::with_clock(config, ClockSource::with_wall_clock(|| WALL_MS));
    (controller, SimClock::start(), MockCommands::new(), RecordingSink::new())
}

fn make() -> (Controller, SimClock, MockCommands, RecordingSink) {
    make_with(&ControllerConfig::default())
}

fn set(c: &mut Controller, device: Device, metric: Metric, payload: &str) {
    let update = IngestUpdate::decode(device, metric, payload, 1).unwrap();
    c.ingest(&update).unwrap();
}

/// Mild day, wet concrete: nothing to do and nothing to report.
fn settle(c: &mut Controller) {
    set(c, Device::Concrete, Metric::Temperature, "20");
    set(c, Device::Concrete, Metric::Humidity, "90");
    set(c, Device::Ambient, Metric::Temperature, "19");
    set(c, Device::Ambient, Metric::Humidity, "70");
}

// ── Clock ────────────────────────────────────────────────────

#[test]
fn first_tick_anchors_pour_and_reports_start() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);

    let outcome = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(outcome.now_ms, clock.now());
    assert_eq!(outcome.concrete_age_hours, 0);
    assert_eq!(c.clock().state().pour_anchor_ms, Some(clock.now()));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Started { simulated: true, .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PourAnchored { .. })), 1);
    assert!(out.calls.is_empty());
    assert!(c.alarms().is_empty());
    assert_eq!(c.tick_count(), 1);
}

#[test]
fn age_follows_the_feed_and_targets_relax() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    c.tick(&mut clock, &mut out, &mut sink);

    clock.advance_minutes(13 * 60);
    let outcome = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(outcome.concrete_age_hours, 13);
    assert_eq!(outcome.targets.target_humidity, 60.0);
    assert_eq!(outcome.targets.max_temp_diff, 5.0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Started { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PourAnchored { .. })), 1);
}

#[test]
fn wall_clock_without_feed() {
    let (mut c, _, mut out, mut sink) = make();
    let mut clock = SimClock::wall_clock();
    settle(&mut c);

    let outcome = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(outcome.now_ms, WALL_MS);
    assert_eq!(outcome.concrete_age_hours, 0);
    let status = c.status();
    assert!(!status.simulated);
    assert_eq!(status.targets.target_humidity, 80.0);
}

#[test]
fn broken_feed_keeps_previous_time() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    let first = c.tick(&mut clock, &mut out, &mut sink);

    clock.broken = true;
    clock.advance_minutes(60);
    let second = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(second.now_ms, first.now_ms);
    assert!(c.status().simulated);
}

#[test]
fn feed_vanishing_mid_run_is_reported_and_time_holds() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    let first = c.tick(&mut clock, &mut out, &mut sink);

    clock.now_ms = None;
    assert!(matches!(
        c.refresh_clock(&mut clock, &mut sink),
        Err(TimeFeedError::Unavailable(_))
    ));
    let second = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(second.now_ms, first.now_ms);
    assert_ne!(second.now_ms, WALL_MS);
    assert!(c.status().simulated);
    assert_eq!(c.tick_count(), 2);
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn no_commands_before_first_readings() {
    let (mut c, mut clock, mut out, mut sink) = make();

    // Zeroed defaults would otherwise read as frozen, dry concrete.
    let outcome = c.tick(&mut clock, &mut out, &mut sink);
    assert!(outcome.commands.is_empty());
    assert!(out.calls.is_empty());
    assert!(outcome.alarms_raised > 0, "alarms still run");

    set(&mut c, Device::Concrete, Metric::Temperature, "3");
    clock.advance_minutes(10);
    c.tick(&mut clock, &mut out, &mut sink);
    assert!(out.calls.is_empty(), "ambient has not reported yet");
    assert!(!c.status().heater.active);

    set(&mut c, Device::Ambient, Metric::Temperature, "5");
    clock.advance_minutes(10);
    c.tick(&mut clock, &mut out, &mut sink);
    assert!(out.heater_on());
}

// ── Pump cycle ───────────────────────────────────────────────

#[test]
fn irrigation_runs_for_granted_time_then_cools_down() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Humidity, "70");

    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(
        out.calls,
        vec![CommandCall::Pump {
            active: true,
            duration_minutes: 300
        }]
    );

    // Still running one minute before expiry, with a live countdown.
    clock.advance_minutes(299);
    let outcome = c.tick(&mut clock, &mut out, &mut sink);
    assert!(outcome.commands.is_empty());
    assert_eq!(c.status().pump_minutes_left, 1);

    clock.advance_minutes(1);
    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(
        out.calls.last(),
        Some(&CommandCall::Pump {
            active: false,
            duration_minutes: 0
        })
    );
    assert!(!c.status().pump.active);

    // Concrete is still dry, but the pump must rest first.
    clock.advance_minutes(14);
    c.tick(&mut clock, &mut out, &mut sink);
    assert!(!out.pump_on());

    clock.advance_minutes(2);
    c.tick(&mut clock, &mut out, &mut sink);
    assert!(out.pump_on());
    assert_eq!(out.calls.len(), 3);
}

#[test]
fn large_deficit_gets_long_run() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Humidity, "55");

    c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(
        out.calls,
        vec![CommandCall::Pump {
            active: true,
            duration_minutes: 600
        }]
    );
}

#[test]
fn pump_stops_once_surface_is_wet_again() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Humidity, "70");
    c.tick(&mut clock, &mut out, &mut sink);

    set(&mut c, Device::Concrete, Metric::Humidity, "88");
    clock.advance_minutes(20);
    c.tick(&mut clock, &mut out, &mut sink);

    assert!(!out.pump_on());
    assert_eq!(c.store().pump.last_deactivation_ms, clock.now());
}

#[test]
fn freezing_air_blocks_irrigation() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Humidity, "40");
    set(&mut c, Device::Ambient, Metric::Temperature, "1.5");
    set(&mut c, Device::Concrete, Metric::Temperature, "6");

    c.tick(&mut clock, &mut out, &mut sink);

    assert!(!out.pump_on());
}

// ── Heater ───────────────────────────────────────────────────

#[test]
fn cold_air_prewarms_water_before_pumping() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Temperature, "12");
    set(&mut c, Device::Concrete, Metric::Humidity, "70");
    set(&mut c, Device::Ambient, Metric::Temperature, "8");

    c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(
        out.calls,
        vec![
            CommandCall::Heater {
                active: true,
                target_c: 25.0
            },
            CommandCall::Pump {
                active: true,
                duration_minutes: 300
            },
        ]
    );
}

#[test]
fn cold_air_alone_does_not_heat_when_coupled() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Temperature, "12");
    set(&mut c, Device::Ambient, Metric::Temperature, "8");

    c.tick(&mut clock, &mut out, &mut sink);

    assert!(out.calls.is_empty());
}

#[test]
fn independent_coupling_heats_on_cold_air_alone() {
    let config = ControllerConfig {
        heater_coupling: HeaterCoupling::Independent,
        ..ControllerConfig::default()
    };
    let (mut c, mut clock, mut out, mut sink) = make_with(&config);
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Temperature, "12");
    set(&mut c, Device::Ambient, Metric::Temperature, "8");

    c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(
        out.calls,
        vec![CommandCall::Heater {
            active: true,
            target_c: 25.0
        }]
    );
}

#[test]
fn cold_concrete_heats_until_recovered() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Temperature, "3");
    set(&mut c, Device::Ambient, Metric::Temperature, "5");

    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(
        out.calls,
        vec![CommandCall::Heater {
            active: true,
            target_c: 10.0
        }]
    );
    assert_eq!(c.status().heater.target_temperature, 10.0);

    clock.advance_minutes(10);
    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(out.calls.len(), 1, "no repeat while still cold");

    set(&mut c, Device::Concrete, Metric::Temperature, "7");
    clock.advance_minutes(10);
    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(
        out.calls.last(),
        Some(&CommandCall::Heater {
            active: false,
            target_c: 0.0
        })
    );
    assert_eq!(c.status().heater.target_temperature, 0.0);
}

// ── Alarms ───────────────────────────────────────────────────

#[test]
fn critical_alarm_repeats_every_tick() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Temperature, "-1");
    set(&mut c, Device::Ambient, Metric::Temperature, "-1");

    for _ in 0..3 {
        c.tick(&mut clock, &mut out, &mut sink);
        clock.advance_minutes(10);
    }

    let critical: Vec<_> = c.alarms().iter().filter(|a| a.level == AlarmLevel::Critical).collect();
    assert_eq!(critical.len(), 3);
    assert!(critical.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlarmRaised(_))), 3);
}

#[test]
fn low_battery_is_informational() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Heater, Metric::Battery, "19");
    set(&mut c, Device::Pump, Metric::Battery, "20");

    let outcome = c.tick(&mut clock, &mut out, &mut sink);

    assert_eq!(outcome.alarms_raised, 1);
    assert_eq!(c.alarms()[0].level, AlarmLevel::Info);
    assert!(c.alarms()[0].message.contains("heater"));
}

// ── Transport and ingestion failures ─────────────────────────

#[test]
fn failed_send_keeps_the_transition() {
    let (mut c, mut clock, _, mut sink) = make();
    let mut out = MockCommands::offline();
    settle(&mut c);
    set(&mut c, Device::Concrete, Metric::Humidity, "70");

    let outcome = c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(outcome.failed_commands, 1);
    assert!(c.status().pump.active);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandFailed { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PumpSwitched { .. })), 0);

    clock.advance_minutes(10);
    c.tick(&mut clock, &mut out, &mut sink);
    assert_eq!(out.calls.len(), 1, "no retry");
}

#[test]
fn rejected_reading_keeps_prior_value() {
    let (mut c, _, _, _) = make();
    settle(&mut c);

    assert!(IngestUpdate::decode(Device::Concrete, Metric::Humidity, "soaked", 5).is_err());
    let pump_humidity = IngestUpdate::decode(Device::Pump, Metric::Humidity, "50", 5).unwrap();
    assert!(c.ingest(&pump_humidity).is_err());

    assert_eq!(c.store().concrete.humidity, 90.0);
    assert_eq!(c.store().pump.last_update_ms, 0);
}

#[test]
fn device_errors_show_in_status() {
    let (mut c, mut clock, mut out, mut sink) = make();
    settle(&mut c);
    set(&mut c, Device::Pump, Metric::Error, "valve stuck");
    c.tick(&mut clock, &mut out, &mut sink);

    let status = c.status();
    assert_eq!(status.device_errors.len(), 1);
    assert_eq!(status.device_errors[0].device, Device::Pump);
    assert_eq!(status.device_errors[0].error, "valve stuck");

    set(&mut c, Device::Pump, Metric::Error, "ok");
    assert!(c.status().device_errors.is_empty());
}
