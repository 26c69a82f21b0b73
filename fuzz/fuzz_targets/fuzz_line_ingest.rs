//! Fuzz target: inbound `topic payload` lines
//!
//! Drives arbitrary text through line routing, payload decoding and the
//! reading store, then runs one decision tick over the result.
//!
//! Invariants checked:
//! - No panics under any input
//! - Accepted numeric readings are finite and inside their plausible range
//! - A rejected reading leaves the store untouched
//!
//! cargo fuzz run fuzz_line_ingest

#![no_main]

use curectl::adapters::line_transport::decode_line;
use curectl::adapters::topics::TopicMap;
use curectl::app::ingest::IngestUpdate;
use curectl::config::{ControlLimits, HeaterCoupling};
use curectl::control::DecisionEngine;
use curectl::policy::targets_for_age;
use curectl::store::{Reading, ReadingStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let topics = TopicMap::new("slab1");
    let mut store = ReadingStore::new();

    for line in text.lines() {
        let Ok(Some(inbound)) = decode_line(&topics, line) else {
            continue;
        };
        let Ok(update) = IngestUpdate::decode(inbound.device, inbound.metric, inbound.payload, 1) else {
            continue;
        };
        match update.reading {
            Reading::Temperature(t) => assert!(t.is_finite() && (-60.0..=100.0).contains(&t)),
            Reading::Humidity(h) => assert!((0.0..=100.0).contains(&h)),
            Reading::Battery(b) => assert!(b <= 100),
            Reading::Error(_) => {}
        }
        let before = store.clone();
        if store.apply(update.device, &update.reading, update.timestamp_ms).is_err() {
            assert_eq!(store, before);
        }
    }

    let engine = DecisionEngine::new(ControlLimits::default(), HeaterCoupling::PumpAware);
    let decision = engine.decide(&store, targets_for_age(0), 1);
    let _ = engine.apply(&decision, &mut store, 1);
});
