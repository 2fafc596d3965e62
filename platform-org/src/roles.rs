//! Role priority lists
//!
//! This module defines the role labels attached to membership edges and the
//! per-resource-kind priority lists that order them. A role's privilege is its
//! position in the list: the last entry is the highest ("manager"-equivalent)
//! role, the first entry is the lowest.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Read-only access to content, folders and user profiles.
pub const VIEWER: &str = "viewer";

/// Can edit collaborative content.
pub const EDITOR: &str = "editor";

/// Participant in a group or discussion.
pub const MEMBER: &str = "member";

/// Full control over a resource, including its member list.
pub const MANAGER: &str = "manager";

/// An ordered list of roles, lowest privilege first.
///
/// Priority lists are total orders: every role in the list compares against
/// every other role, and labels outside the list are invalid for the resource
/// kind the list belongs to.
///
/// # Examples
///
/// ```
/// use platform_org::RolePriority;
///
/// let priority = RolePriority::new(["viewer", "manager"]);
/// assert_eq!(priority.highest(), Some("manager"));
/// assert_eq!(priority.highest_of(["viewer", "manager", "viewer"]), Some("manager"));
/// assert!(!priority.contains("owner"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePriority(Vec<String>);

impl RolePriority {
    /// Create a priority list from roles ordered lowest to highest.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    /// The roles in priority order, lowest first.
    pub fn roles(&self) -> &[String] {
        &self.0
    }

    /// Position of a role in the list, or `None` if the role is invalid here.
    pub fn rank(&self, role: &str) -> Option<usize> {
        self.0.iter().position(|r| r == role)
    }

    /// Check whether a role label is valid for this list.
    pub fn contains(&self, role: &str) -> bool {
        self.rank(role).is_some()
    }

    /// The least privileged role.
    pub fn lowest(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The most privileged role.
    pub fn highest(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Check whether a role is the most privileged role of the list.
    pub fn is_highest(&self, role: &str) -> bool {
        self.highest() == Some(role)
    }

    /// Select the most privileged of the given roles.
    ///
    /// Roles outside the list are ignored. Returns `None` if no valid role was
    /// given.
    pub fn highest_of<'a, I>(&self, roles: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        roles
            .into_iter()
            .filter_map(|role| self.rank(role).map(|rank| (rank, role)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, role)| role)
    }

    /// Compare two roles by privilege.
    ///
    /// Returns `None` if either role is not part of the list.
    pub fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        Some(self.rank(a)?.cmp(&self.rank(b)?))
    }

    /// Number of roles in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the list has no roles.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for RolePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" < "))
    }
}
