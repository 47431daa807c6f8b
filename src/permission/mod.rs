//! Runtime permission gating.
//!
//! Tracks the grant/deny/rationale status of a fixed list of requested
//! capabilities and decides what the host should present:
//! - protected content (everything granted)
//! - a rationale prompt listing the ids the platform wants explained
//! - a progress indicator while a request round-trip is outstanding
//! - a degraded fallback with an "open settings" action

pub mod gate;
pub mod oracle;
pub mod request;

pub use gate::*;
pub use oracle::*;
pub use request::*;
