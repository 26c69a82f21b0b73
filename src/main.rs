//! curectl, the concrete-curing controller, main entry point.
//!
//! Hexagonal architecture with a fixed-interval tick.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  stdin ──▶ ingest thread          LineCommandPort ──▶ stdout │
//! │  JsonTimeFeed    JsonConfigFile   LogEventSink    StatusFile │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │        SharedController ─▶ Controller (pure logic)     │  │
//! │  │   Clock · ReadingStore · Alarms · Decisions            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr so stdout carries nothing but commands.
#![deny(unused_must_use)]

use std::io;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};

use curectl::adapters::config_file::JsonConfigFile;
use curectl::adapters::line_transport::{LineCommandPort, ingest_lines};
use curectl::adapters::log_sink::LogEventSink;
use curectl::adapters::status_file::StatusFile;
use curectl::adapters::time_feed::{JsonTimeFeed, NoTimeFeed};
use curectl::adapters::topics::TopicMap;
use curectl::app::ports::{ConfigPort, TimeFeedPort};
use curectl::app::service::Controller;
use curectl::app::shared::SharedController;
use curectl::clock::ClockRefresh;
use curectl::config::ControllerConfig;

const DEFAULT_CONFIG_PATH: &str = "curectl.json";

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "curectl=info".into()),
        )
        .init();

    // ── 2. Configuration ──────────────────────────────────────
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let config = JsonConfigFile::new(&config_path)
        .load()
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    info!(
        "curectl v{} | prefix={} | tick={}ms | coupling={:?}",
        env!("CARGO_PKG_VERSION"),
        config.topic_prefix,
        config.tick_interval_ms,
        config.heater_coupling
    );

    match config.time_feed_path.clone() {
        Some(path) => {
            info!("Simulated time feed: {}", path.display());
            run(&config, JsonTimeFeed::new(path))
        }
        None => run(&config, NoTimeFeed),
    }
}

fn run(config: &ControllerConfig, mut feed: impl TimeFeedPort) -> Result<()> {
    let topics = TopicMap::new(config.topic_prefix.clone());
    let mut sink = LogEventSink::new();

    // ── 3. Controller + startup clock read ────────────────────
    let mut controller = Controller::new(config);
    match controller.refresh_clock(&mut feed, &mut sink) {
        Ok(ClockRefresh::WallClock) => info!("No simulation running; using wall clock"),
        Ok(ClockRefresh::Simulated { now_ms, .. }) => info!("Starting on simulated time {now_ms} ms"),
        Err(_) => warn!("Starting on wall clock until the time feed recovers"),
    }
    let shared = SharedController::new(controller);

    // ── 4. Ingestion thread ───────────────────────────────────
    let ingest_shared = shared.clone();
    let ingest_topics = topics.clone();
    let _ingest = thread::Builder::new()
        .name("ingest".into())
        .spawn(move || match ingest_lines(io::stdin().lock(), &ingest_topics, &ingest_shared) {
            Ok(stats) => info!(
                "Input closed: {} readings accepted, {} rejected",
                stats.accepted, stats.rejected
            ),
            Err(e) => error!("Input read failed: {e}"),
        })
        .context("Failed to spawn ingest thread")?;

    info!("Site prefix '{}'", topics.prefix());
    for topic in topics.subscriptions() {
        info!("Listening on {topic}");
    }

    // ── 5. Tick loop ──────────────────────────────────────────
    let mut out = LineCommandPort::new(io::stdout(), topics);
    let status_file = config.status_path.clone().map(StatusFile::new);
    let interval = Duration::from_millis(config.tick_interval_ms);

    info!("Controller ready. Entering tick loop.");
    loop {
        // First tick waits one interval so the initial readings can land.
        thread::sleep(interval);
        shared.tick(&mut feed, &mut out, &mut sink);

        if let Some(file) = &status_file {
            let (status, alarms) = shared.with(|c| (c.status(), c.alarms().to_vec()));
            if let Err(e) = file.write(&status, &alarms) {
                warn!("Status file not written: {e:#}");
            }
        }
    }
}
