//! Foreground presentation.
//!
//! Keeps a long-running collector visible to the host OS (a persistent
//! notification on mobile, a status line for a daemon supervisor).

use crate::error::PresentationError;

pub trait ForegroundPresenter: Send + Sync {
    /// Called once per start of the tracking service.
    fn announce(&self, title: &str, text: &str) -> Result<(), PresentationError>;

    /// Called when the service stops.
    fn withdraw(&self) {}
}

/// Presenter that only writes the announcement to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl ForegroundPresenter for LogPresenter {
    fn announce(&self, title: &str, text: &str) -> Result<(), PresentationError> {
        log::info!("FOREGROUND_ANNOUNCE title={:?} text={:?}", title, text);
        Ok(())
    }

    fn withdraw(&self) {
        log::info!("FOREGROUND_WITHDRAW");
    }
}
