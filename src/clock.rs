//! Controller clock: wall time or an externally fed simulated time.
//!
//! The simulation harness advances time in steps (e.g. 10 minutes per
//! step) and publishes the current simulated instant through a feed.
//! [`ClockSource::refresh`] polls that feed once per tick.  The first
//! valid instant it sees becomes the **pour anchor** from which concrete
//! age is measured; the anchor never moves afterwards.
//!
//! - **Simulated timestamp set and positive**: `now()` returns it.
//! - **Otherwise**: `now()` falls back to the wall clock.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::TimeFeedPort;
use crate::error::TimeFeedError;

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 3_600_000;

const DEFAULT_STEP_MINUTES: u32 = 10;

/// Outcome of one [`TimeFeedPort::read`].
pub type FeedRead = Result<Option<TimeFeed>, TimeFeedError>;

/// Wall-clock milliseconds since the Unix epoch.
pub fn system_time_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// One record of the simulated-time feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFeed {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

fn default_step_minutes() -> u32 {
    DEFAULT_STEP_MINUTES
}

impl TimeFeed {
    /// Milliseconds since the epoch, interpreting date and time as UTC.
    pub fn timestamp_ms(&self) -> Result<i64, TimeFeedError> {
        let invalid = || TimeFeedError::InvalidTimestamp {
            date: self.date.clone(),
            time: self.time.clone(),
        };
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M:%S").map_err(|_| invalid())?;
        Ok(NaiveDateTime::new(date, time).and_utc().timestamp_millis())
    }
}

/// Clock bookkeeping, exposed read-only for status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub simulated_timestamp_ms: Option<i64>,
    pub pour_anchor_ms: Option<i64>,
    pub step_minutes: u32,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            simulated_timestamp_ms: None,
            pour_anchor_ms: None,
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

/// What a successful [`ClockSource::refresh`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRefresh {
    /// The feed reported no simulation and none had started; the wall
    /// clock stays in charge.
    WallClock,
    /// Simulated time was read.  `advanced_minutes` is relative to the
    /// previous simulated instant (0 on the first read).
    Simulated { now_ms: i64, advanced_minutes: i64, anchored: bool },
}

/// Supplies "now" and concrete age to the rest of the controller.
pub struct ClockSource {
    state: ClockState,
    wall: fn() -> i64,
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource {
    pub fn new() -> Self {
        Self::with_wall_clock(system_time_ms)
    }

    /// Use `wall` instead of the system clock (tests, replays).
    pub fn with_wall_clock(wall: fn() -> i64) -> Self {
        Self {
            state: ClockState::default(),
            wall,
        }
    }

    /// A clock pinned to `now_ms` with the pour anchor already fixed.
    pub fn simulated(anchor_ms: i64, now_ms: i64) -> Self {
        let mut clock = Self::new();
        clock.state.pour_anchor_ms = Some(anchor_ms);
        clock.state.simulated_timestamp_ms = Some(now_ms);
        clock
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> i64 {
        match self.state.simulated_timestamp_ms {
            Some(ts) if ts > 0 => ts,
            _ => (self.wall)(),
        }
    }

    /// Whether `now()` is currently driven by the simulated feed.
    pub fn is_simulated(&self) -> bool {
        matches!(self.state.simulated_timestamp_ms, Some(ts) if ts > 0)
    }

    /// Whole hours since the pour anchor, never negative; 0 before anchoring.
    pub fn concrete_age_hours(&self) -> i64 {
        match self.state.pour_anchor_ms {
            Some(anchor) => ((self.now() - anchor) / MS_PER_HOUR).max(0),
            None => 0,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Move simulated time directly (replays and tests).
    pub fn set_simulated(&mut self, now_ms: i64) {
        self.state.simulated_timestamp_ms = Some(now_ms);
    }

    /// Re-read the simulated-time feed.
    ///
    /// On error nothing changes: the previous simulated instant (or the
    /// wall clock) stays in effect and the caller decides how loudly to
    /// complain.
    pub fn refresh(&mut self, feed: &mut impl TimeFeedPort) -> Result<ClockRefresh, TimeFeedError> {
        self.apply_feed(feed.read())
    }

    /// Apply the result of a feed read taken elsewhere.
    ///
    /// A feed that reports no simulation after one has started is an
    /// error, not a return to the wall clock: the last simulated instant
    /// is kept and the caller hears about it.
    pub fn apply_feed(&mut self, read: FeedRead) -> Result<ClockRefresh, TimeFeedError> {
        let Some(record) = read? else {
            if self.state.simulated_timestamp_ms.is_some() {
                return Err(TimeFeedError::Unavailable(
                    "feed vanished after simulation started".into(),
                ));
            }
            return Ok(ClockRefresh::WallClock);
        };
        let ts = record.timestamp_ms()?;

        let previous = self.state.simulated_timestamp_ms;
        self.state.simulated_timestamp_ms = Some(ts);
        self.state.step_minutes = record.step_minutes;

        let anchored = self.state.pour_anchor_ms.is_none() && ts > 0;
        if anchored {
            self.state.pour_anchor_ms = Some(ts);
            info!("Pour anchor fixed at {} {} ({} ms)", record.date, record.time, ts);
        }

        let advanced_minutes = previous.map_or(0, |p| (ts - p) / MS_PER_MINUTE);
        if advanced_minutes != 0 {
            debug!(
                "Simulated time {} {} (+{} min)",
                record.date, record.time, advanced_minutes
            );
        }

        Ok(ClockRefresh::Simulated {
            now_ms: ts,
            advanced_minutes,
            anchored,
        })
    }
}
