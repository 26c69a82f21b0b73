//! Age-dependent curing targets.
//!
//! Fresh concrete needs a saturated surface and tolerates only a small
//! gap to the surrounding air; both requirements relax as it hardens.
//! Bucket upper bounds are inclusive: at exactly 12 h the first bucket
//! still applies.

use serde::Serialize;

/// Targets that apply to concrete of a given age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CuringTargets {
    /// Minimum surface humidity (%).
    pub target_humidity: f32,
    /// Largest tolerated |concrete − ambient| temperature gap (°C).
    pub max_temp_diff: f32,
}

/// Humidity buckets: (inclusive upper age bound in hours, target %).
const HUMIDITY_BUCKETS: [(i64, f32); 5] = [(12, 80.0), (24, 60.0), (48, 50.0), (72, 40.0), (168, 15.0)];
const HUMIDITY_MATURE: f32 = 15.0;

/// Temperature-gap buckets: (inclusive upper age bound in hours, max diff °C).
const TEMP_DIFF_BUCKETS: [(i64, f32); 3] = [(12, 3.0), (24, 5.0), (168, 7.0)];
const TEMP_DIFF_MATURE: f32 = 7.0;

/// Target surface humidity for concrete `age_hours` old.
pub fn target_humidity(age_hours: i64) -> f32 {
    lookup(&HUMIDITY_BUCKETS, HUMIDITY_MATURE, age_hours)
}

/// Maximum concrete/ambient temperature gap for concrete `age_hours` old.
pub fn max_temp_diff(age_hours: i64) -> f32 {
    lookup(&TEMP_DIFF_BUCKETS, TEMP_DIFF_MATURE, age_hours)
}

/// Both targets at once.
pub fn targets_for_age(age_hours: i64) -> CuringTargets {
    CuringTargets {
        target_humidity: target_humidity(age_hours),
        max_temp_diff: max_temp_diff(age_hours),
    }
}

fn lookup(buckets: &[(i64, f32)], mature: f32, age_hours: i64) -> f32 {
    buckets
        .iter()
        .find(|(upper, _)| age_hours <= *upper)
        .map_or(mature, |(_, value)| *value)
}
