//! Sample ingestion pipeline.
//!
//! Coordinates the path from provider callback to storage:
//! - Session context for log correlation
//! - Fix -> sample conversion with running distance
//! - Single-writer append queue

pub mod context;
pub mod ingestion;
pub mod writer;

pub use context::*;
pub use ingestion::*;
pub use writer::*;
