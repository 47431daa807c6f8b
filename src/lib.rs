//! Meerkat Core - permission-gated location sampling
//!
//! This crate provides the core of a location tracking daemon: a runtime
//! permission gate and a location sampler that persists every delivered fix.
//! The implementation prioritizes:
//!
//! 1. **Ordering** - Samples reach the store in exactly the order they arrived
//! 2. **Logging** - Every state transition logged with component and session
//! 3. **Containment** - Platform failures surface as `last_error`, never as a crash
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `permission` - Permission gate state machine and the platform oracle seam
//! - `location` - Fixes, provider seam, polling config and the sampler
//! - `pipeline` - Session context, fix -> sample conversion, single-writer queue
//! - `storage` - Sample model, SQL query builders, SQLite and in-memory stores
//! - `service` - Tracking service host wiring gate, sampler and presenter
//! - `foreground` - Foreground presentation seam
//! - `counter` - Periodic tick counter
//! - `config` - JSON configuration
//! - `logging` - Structured logging with component context

pub mod config;
pub mod counter;
pub mod error;
pub mod foreground;
pub mod location;
pub mod logging;
pub mod permission;
pub mod pipeline;
pub mod service;
pub mod storage;

#[cfg(test)]
mod testkit;

pub use config::{NotificationConfig, TrackerConfig};
pub use counter::TickCounter;
pub use error::{
    ConfigError, PermissionError, PresentationError, ProviderError, SamplerError, ServiceError,
    StorageError,
};
pub use foreground::{ForegroundPresenter, LogPresenter};
pub use location::{
    Accuracy, EventSink, LocationFix, LocationProvider, LocationSampler, PollingConfig,
    ProviderEvent, Reading, SamplerPhase, SamplerState, SubscriptionId,
};
pub use permission::{GatePhase, GateView, PermissionGate, PermissionOracle, PermissionRequest};
pub use service::{ServiceStatus, TrackingService};
pub use storage::{LocationSample, MemorySampleStore, SampleStore, SqliteSampleStore};

/// Initialize the process-wide logger.
///
/// `RUST_LOG` overrides `level` when set. Safe to call more than once.
pub fn init_logger(level: log::LevelFilter) {
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
