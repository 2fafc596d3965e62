//! # Capabilities
//!
//! The three questions the permission checker answers about a resource.

use serde::{Deserialize, Serialize};

/// A capability a viewer may hold on a resource.
///
/// - **View**: read the resource and its profile
/// - **Manage**: change the resource, its members and its visibility
/// - **Interact**: share with, message, follow or join the resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read the resource.
    View,

    /// Administer the resource.
    ///
    /// Requires the most privileged role of the resource kind.
    Manage,

    /// Act on the resource on one's own behalf.
    ///
    /// Never granted to anonymous viewers, and never on oneself.
    Interact,
}

impl Capability {
    /// All capabilities, least demanding first.
    pub fn all() -> [Capability; 3] {
        [Capability::View, Capability::Interact, Capability::Manage]
    }

    /// Get the string representation of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Manage => "manage",
            Capability::Interact => "interact",
        }
    }

    /// Parse a capability (case-insensitive, supports aliases).
    ///
    /// # Example
    ///
    /// ```
    /// use platform_rbac::actions::Capability;
    ///
    /// assert_eq!(Capability::parse("view"), Some(Capability::View));
    /// assert_eq!(Capability::parse("read"), Some(Capability::View));
    /// assert_eq!(Capability::parse("share"), Some(Capability::Interact));
    /// assert_eq!(Capability::parse("delete"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "view" | "read" => Some(Capability::View),
            "manage" | "admin" => Some(Capability::Manage),
            "interact" | "share" => Some(Capability::Interact),
            _ => None,
        }
    }

    /// Check whether the capability requires an authenticated viewer.
    pub fn requires_authentication(&self) -> bool {
        !matches!(self, Capability::View)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
