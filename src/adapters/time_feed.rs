//! Simulated-time feed adapters.
//!
//! The simulation harness rewrites a small JSON file on every step:
//!
//! ```json
//! { "date": "2025-05-06", "time": "21:40:00", "step_minutes": 10 }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::app::ports::TimeFeedPort;
use crate::clock::TimeFeed;
use crate::error::TimeFeedError;

/// Reads the feed file on every poll.  A missing file means "no
/// simulation"; an unreadable or malformed one is an error.
pub struct JsonTimeFeed {
    path: PathBuf,
}

impl JsonTimeFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimeFeedPort for JsonTimeFeed {
    fn read(&mut self) -> Result<Option<TimeFeed>, TimeFeedError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TimeFeedError::Unavailable(format!("{}: {e}", self.path.display()))),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| TimeFeedError::Corrupted(format!("{}: {e}", self.path.display())))
    }
}

/// Always on the wall clock.
pub struct NoTimeFeed;

impl TimeFeedPort for NoTimeFeed {
    fn read(&mut self) -> Result<Option<TimeFeed>, TimeFeedError> {
        Ok(None)
    }
}
