//! Permission identifiers and per-id status.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";
pub const POST_NOTIFICATIONS: &str = "android.permission.POST_NOTIFICATIONS";

lazy_static! {
    /// Human-readable labels shown on rationale prompts.
    static ref DISPLAY_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        (ACCESS_COARSE_LOCATION, "Coarse Location"),
        (ACCESS_FINE_LOCATION, "Fine Location"),
        (POST_NOTIFICATIONS, "Notifications"),
    ]);
}

/// Label for a permission id, falling back to the id itself.
pub fn display_name(id: &str) -> &str {
    DISPLAY_NAMES.get(id).copied().unwrap_or(id)
}

/// One capability to request, identified in the platform's permission namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionRequest {
    id: String,
}

impl PermissionRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for PermissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for PermissionRequest {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Grant state of one requested id.
///
/// `should_show_rationale` is only meaningful while denied and is forced back
/// to `false` whenever the id becomes granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionStatus {
    granted: bool,
    should_show_rationale: bool,
}

impl PermissionStatus {
    pub fn denied(should_show_rationale: bool) -> Self {
        Self {
            granted: false,
            should_show_rationale,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    pub fn should_show_rationale(&self) -> bool {
        self.should_show_rationale
    }

    pub fn set_granted(&mut self, granted: bool) {
        self.granted = granted;
        if granted {
            self.should_show_rationale = false;
        }
    }

    /// Ignored while granted.
    pub fn set_rationale(&mut self, should_show_rationale: bool) {
        self.should_show_rationale = !self.granted && should_show_rationale;
    }
}
