//! Location provider contract.
//!
//! A provider accepts one `EventSink` per subscription and pushes typed
//! `ProviderEvent`s into it from its own delivery thread until the
//! subscription is removed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProviderError};

use super::fix::LocationFix;

/// Power/accuracy trade-off requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    #[default]
    HighAccuracy,
    BalancedPowerAccuracy,
    LowPower,
    Passive,
}

/// Polling parameters handed to `LocationProvider::subscribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub desired_accuracy: Accuracy,
    /// Fastest rate at which fixes are accepted.
    pub min_interval_ms: u64,
    /// Slowest update interval under power-save batching.
    pub max_interval_ms: u64,
    /// Longest a provider may hold fixes back to deliver them as a batch.
    pub max_delay_ms: u64,
    /// Wait for an accurate first fix instead of delivering a coarse one.
    pub require_accurate_fix: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: Accuracy::HighAccuracy,
            min_interval_ms: 5_000,
            max_interval_ms: 10_000,
            max_delay_ms: 20_000,
            require_accurate_fix: false,
        }
    }
}

impl PollingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_ms == 0 || self.max_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "polling intervals must be greater than zero".to_string(),
            ));
        }
        if self.min_interval_ms > self.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "min_interval_ms ({}) exceeds max_interval_ms ({})",
                self.min_interval_ms, self.max_interval_ms
            )));
        }
        Ok(())
    }
}

/// Something a provider reports on an active subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Zero or more fixes, oldest first. Batching providers deliver several.
    FixReceived(Vec<LocationFix>),
    AvailabilityChanged(bool),
}

/// Callback target a provider delivers events into.
#[derive(Clone)]
pub struct EventSink {
    deliver: Arc<dyn Fn(ProviderEvent) + Send + Sync>,
}

impl EventSink {
    pub fn new(deliver: impl Fn(ProviderEvent) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    pub fn deliver(&self, event: ProviderEvent) {
        (self.deliver)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

/// Handle returned by a successful subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait LocationProvider: Send + Sync {
    fn subscribe(
        &self,
        config: &PollingConfig,
        sink: EventSink,
    ) -> Result<SubscriptionId, ProviderError>;

    /// Unknown or already removed ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
