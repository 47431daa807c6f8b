//! Error taxonomy.
//!
//! Every failure is terminal to the single operation that raised it. Nothing
//! here is allowed to take the process down; hosts observe `last_error` and
//! `is_running` instead.

use thiserror::Error;

use crate::permission::GatePhase;

/// Failures reported by the platform permission facility.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("failed to query permission {id}: {reason}")]
    Query { id: String, reason: String },

    #[error("failed to launch permission request: {0}")]
    Request(String),

    #[error("failed to open application settings: {0}")]
    Settings(String),
}

/// Failures a location provider reports when asked to subscribe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("location permission not granted")]
    PermissionDenied,

    #[error("location provider unavailable: {0}")]
    Unavailable(String),
}

/// Failures of `LocationSampler::start`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("PermissionDenied: location permission not granted, cannot start updates")]
    PermissionDenied,

    #[error("ProviderUnavailable: {0}")]
    ProviderUnavailable(String),

    #[error("invalid polling configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<ProviderError> for SamplerError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::PermissionDenied => SamplerError::PermissionDenied,
            ProviderError::Unavailable(reason) => SamplerError::ProviderUnavailable(reason),
        }
    }
}

/// Failures of the sample store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("append rejected: {0}")]
    Rejected(String),

    #[error("sample store is closed")]
    Closed,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to present the foreground notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("foreground presentation failed: {0}")]
pub struct PresentationError(pub String);

/// Configuration loading and validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("{0}")]
    Invalid(String),
}

/// Failures of the tracking service host.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("location tracking not permitted, gate phase is {0:?}")]
    NotPermitted(GatePhase),

    #[error(transparent)]
    Presentation(#[from] PresentationError),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Permission(#[from] PermissionError),
}
