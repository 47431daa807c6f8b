//! Database models for sample storage.
//!
//! `LocationSample` mirrors one row of the `location_entity` table.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::location::fix::{LocationFix, Reading};

/// One persisted location fix.
///
/// `id` is assigned by the store on insert and is `None` before that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Reading<f64>,
    pub accuracy: Reading<f32>,
    pub vertical_accuracy_meters: f32,
    pub speed: Reading<f32>,
    pub speed_accuracy_meters_per_second: f32,
    pub bearing: f32,
    pub bearing_accuracy_degrees: Reading<f32>,
    /// UNIX time, milliseconds.
    pub time: i64,
    pub elapsed_realtime_nanos: i64,
    pub provider: String,
    /// Distance from the previous sample of the same run, meters.
    pub distance_meters: f32,
}

impl LocationSample {
    /// Field-for-field copy of a fix. Presence comes from the fix's own flags.
    pub fn from_fix(fix: &LocationFix, distance_meters: f32) -> Self {
        Self {
            id: None,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: Reading::from_parts(fix.altitude, fix.has_altitude),
            accuracy: Reading::from_parts(fix.accuracy, fix.has_accuracy),
            vertical_accuracy_meters: fix.vertical_accuracy_meters,
            speed: Reading::from_parts(fix.speed, fix.has_speed),
            speed_accuracy_meters_per_second: fix.speed_accuracy_meters_per_second,
            bearing: fix.bearing,
            bearing_accuracy_degrees: Reading::from_parts(
                fix.bearing_accuracy_degrees,
                fix.has_bearing_accuracy,
            ),
            time: fix.time,
            elapsed_realtime_nanos: fix.elapsed_realtime_nanos,
            provider: fix.provider.clone(),
            distance_meters,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Capture time, if `time` is a representable instant.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time).single()
    }
}
