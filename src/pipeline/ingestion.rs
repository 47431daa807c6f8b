//! Fix batch ingestion.
//!
//! Turns one provider batch into samples, in delivery order, chaining the
//! distance of each sample to the one before it.

use crate::location::distance::haversine_meters;
use crate::location::fix::LocationFix;
use crate::logging::structured::LogContext;
use crate::storage::models::LocationSample;

/// Last position seen in the current run, used to chain distances.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trail {
    last: Option<(f64, f64)>,
    pub total_meters: f64,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance from the previous position, then remember this one.
    pub fn advance(&mut self, latitude: f64, longitude: f64) -> f64 {
        let step = match self.last {
            Some((lat, lon)) => haversine_meters(lat, lon, latitude, longitude),
            None => 0.0,
        };
        self.last = Some((latitude, longitude));
        self.total_meters += step;
        step
    }
}

/// Convert a batch of fixes. No reordering or deduplication is performed.
pub fn samples_from_fixes(
    fixes: &[LocationFix],
    trail: &mut Trail,
    ctx: &LogContext,
) -> Vec<LocationSample> {
    let samples: Vec<LocationSample> = fixes
        .iter()
        .map(|fix| {
            let step = trail.advance(fix.latitude, fix.longitude);
            LocationSample::from_fix(fix, step as f32)
        })
        .collect();

    log::debug!(
        "{} FIX_BATCH_CONVERTED fixes={} total_meters={:.1}",
        ctx,
        samples.len(),
        trail.total_meters
    );

    samples
}
