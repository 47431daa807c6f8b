//! Raw fixes as a provider reports them, and presence-carrying readings.

use serde::{Deserialize, Serialize};

/// A measured field together with the provider's own "has X" report.
///
/// The raw value is kept even when unreported so that a stored sample reads
/// back exactly as it was delivered; `value()` is what consumers should use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading<T> {
    Reported(T),
    Unreported(T),
}

impl<T: Copy> Reading<T> {
    pub fn from_parts(value: T, reported: bool) -> Self {
        if reported {
            Reading::Reported(value)
        } else {
            Reading::Unreported(value)
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Reading::Reported(_))
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Reading::Reported(v) => Some(*v),
            Reading::Unreported(_) => None,
        }
    }

    pub fn raw(&self) -> T {
        match self {
            Reading::Reported(v) | Reading::Unreported(v) => *v,
        }
    }
}

/// One position report from a location provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above the WGS84 ellipsoid.
    pub altitude: f64,
    pub has_altitude: bool,
    /// Horizontal accuracy radius, meters.
    pub accuracy: f32,
    pub has_accuracy: bool,
    pub vertical_accuracy_meters: f32,
    /// Meters per second.
    pub speed: f32,
    pub has_speed: bool,
    pub speed_accuracy_meters_per_second: f32,
    /// Degrees east of true north.
    pub bearing: f32,
    pub bearing_accuracy_degrees: f32,
    pub has_bearing_accuracy: bool,
    /// UNIX time, milliseconds.
    pub time: i64,
    /// Nanoseconds since boot on the monotonic clock.
    pub elapsed_realtime_nanos: i64,
    /// "gps", "network", "fused", ...
    pub provider: String,
}

impl LocationFix {
    /// A fix with only position and time; every optional field unreported.
    pub fn new(latitude: f64, longitude: f64, time: i64, provider: &str) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            has_altitude: false,
            accuracy: 0.0,
            has_accuracy: false,
            vertical_accuracy_meters: 0.0,
            speed: 0.0,
            has_speed: false,
            speed_accuracy_meters_per_second: 0.0,
            bearing: 0.0,
            bearing_accuracy_degrees: 0.0,
            has_bearing_accuracy: false,
            time,
            elapsed_realtime_nanos: 0,
            provider: provider.to_string(),
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self.has_altitude = true;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = accuracy;
        self.has_accuracy = true;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self.has_speed = true;
        self
    }

    pub fn with_bearing(mut self, bearing: f32, accuracy_degrees: f32) -> Self {
        self.bearing = bearing;
        self.bearing_accuracy_degrees = accuracy_degrees;
        self.has_bearing_accuracy = true;
        self
    }

    pub fn with_elapsed_realtime_nanos(mut self, nanos: i64) -> Self {
        self.elapsed_realtime_nanos = nanos;
        self
    }
}
