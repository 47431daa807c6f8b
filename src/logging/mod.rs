//! Structured logging with component context.
//!
//! Provides logging macros and utilities that include the component name and
//! the sampling session id in every log message for easy correlation.

pub mod structured;

pub use structured::*;
