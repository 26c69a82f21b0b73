//! Fuzz target: simulated-time feed records
//!
//! Feeds arbitrary bytes to the JSON record parser and the date/time
//! conversion.  Neither may panic; garbage must surface as an error.
//!
//! cargo fuzz run fuzz_time_feed

#![no_main]

use curectl::clock::TimeFeed;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = serde_json::from_slice::<TimeFeed>(data) {
        let _ = record.timestamp_ms();
    }
});
