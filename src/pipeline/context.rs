//! Sampling session context.
//!
//! One session spans a single `start()`..`stop()` run of a sampler.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::location::provider::PollingConfig;
use crate::logging::structured::LogContext;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub polling: PollingConfig,
}

impl SessionContext {
    pub fn new(polling: &PollingConfig) -> Self {
        let session_id = format!("sess-{}", &Uuid::new_v4().simple().to_string()[..8]);

        Self {
            session_id,
            started_at: Utc::now(),
            polling: polling.clone(),
        }
    }

    pub fn log_context(&self, component: &str) -> LogContext {
        LogContext::new(component).with_session(&self.session_id)
    }
}
