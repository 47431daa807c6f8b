//! Log line prefixes.
//!
//! Every line starts with `[component=..]`. While a sampler run is active the
//! run's session id follows, so all lines of one `start()`..`stop()` span can
//! be grepped out of a shared daemon log. Events are UPPER_SNAKE names with
//! `key=value` pairs after them.

use std::fmt;

/// Prefix for one component's log lines.
///
/// Components without a run in progress (the gate, the service host) log with
/// no session; the sampler swaps in a session-bound context on `start()`.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub session_id: Option<String>,
}

impl LogContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            session_id: None,
        }
    }

    /// Same component, tagged with a sampling session.
    pub fn with_session(&self, session_id: &str) -> Self {
        Self {
            component: self.component.clone(),
            session_id: Some(session_id.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.session_id {
            Some(sid) => write!(f, "[component={}] [session={}]", self.component, sid),
            None => write!(f, "[component={}]", self.component),
        }
    }
}

/// `info` line: context prefix, event name, then `key=value` pairs.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// `warn` counterpart of [`log_info!`].
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// `error` counterpart of [`log_info!`].
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::error!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// `debug` counterpart of [`log_info!`].
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}
