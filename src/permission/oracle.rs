//! Platform permission facility.

use crate::error::PermissionError;

use super::request::PermissionRequest;

/// Answers grant questions and launches permission prompts.
///
/// `request_permissions` only launches the prompt. The outcome comes back
/// later and is handed to `PermissionGate::on_request_result` by the host.
pub trait PermissionOracle {
    fn is_granted(&self, id: &str) -> Result<bool, PermissionError>;

    fn should_show_rationale(&self, id: &str) -> Result<bool, PermissionError>;

    fn request_permissions(&self, requests: &[PermissionRequest]) -> Result<(), PermissionError>;

    /// Sends the user to the system settings page for this application.
    fn open_settings(&self) -> Result<(), PermissionError>;
}

impl<O: PermissionOracle + ?Sized> PermissionOracle for &O {
    fn is_granted(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).is_granted(id)
    }

    fn should_show_rationale(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).should_show_rationale(id)
    }

    fn request_permissions(&self, requests: &[PermissionRequest]) -> Result<(), PermissionError> {
        (**self).request_permissions(requests)
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        (**self).open_settings()
    }
}

impl<O: PermissionOracle + ?Sized> PermissionOracle for Box<O> {
    fn is_granted(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).is_granted(id)
    }

    fn should_show_rationale(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).should_show_rationale(id)
    }

    fn request_permissions(&self, requests: &[PermissionRequest]) -> Result<(), PermissionError> {
        (**self).request_permissions(requests)
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        (**self).open_settings()
    }
}

impl<O: PermissionOracle + ?Sized> PermissionOracle for std::sync::Arc<O> {
    fn is_granted(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).is_granted(id)
    }

    fn should_show_rationale(&self, id: &str) -> Result<bool, PermissionError> {
        (**self).should_show_rationale(id)
    }

    fn request_permissions(&self, requests: &[PermissionRequest]) -> Result<(), PermissionError> {
        (**self).request_permissions(requests)
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        (**self).open_settings()
    }
}
