//! Pending invitations
//!
//! An invitation is an access grant for someone who has no account yet. It is
//! keyed by email instead of principal id, created when a resource is shared
//! with an unregistered address, re-targeted when the address is re-invited
//! with a different role, and consumed when the address registers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::membership::MemberRole;

/// Normalize an email address for comparison (trimmed, lowercase).
///
/// # Examples
///
/// ```
/// use platform_org::invitation::normalize_email;
///
/// assert_eq!(normalize_email("  Simon@Example.COM "), "simon@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A pending, email-keyed access grant on a resource.
///
/// # Examples
///
/// ```
/// use platform_org::Invitation;
///
/// let invitation = Invitation::new("c:cam:doc", "Nico@Example.com", "u:cam:simon", "viewer");
/// assert_eq!(invitation.email, "nico@example.com");
///
/// let member = invitation.accept("u:cam:nico");
/// assert_eq!(member.principal_id, "u:cam:nico");
/// assert_eq!(member.role, "viewer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Resource the invitation grants access to
    pub resource_id: String,

    /// Normalized email address of the invitee
    pub email: String,

    /// Principal who sent the invitation
    pub inviter_id: String,

    /// Role granted once the invitation is accepted
    pub role: String,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,

    /// When the invitation was last re-targeted
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Creates a new invitation.
    ///
    /// The email is normalized so that invitations compare case-insensitively.
    pub fn new(
        resource_id: impl Into<String>,
        email: &str,
        inviter_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            resource_id: resource_id.into(),
            email: normalize_email(email),
            inviter_id: inviter_id.into(),
            role: role.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-invite the same address with a different role.
    pub fn reinvite(&mut self, inviter_id: impl Into<String>, role: impl Into<String>) {
        self.inviter_id = inviter_id.into();
        self.role = role.into();
        self.updated_at = Utc::now();
    }

    /// Convert the invitation into the membership edge it grants.
    ///
    /// The invitation is consumed: once the invitee registers, the pending
    /// grant stops existing and the membership takes its place.
    pub fn accept(self, principal_id: impl Into<String>) -> MemberRole {
        MemberRole::new(principal_id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_creation() {
        let invitation = Invitation::new("g:cam:team", "A@B.org", "u:cam:simon", "member");

        assert_eq!(invitation.resource_id, "g:cam:team");
        assert_eq!(invitation.email, "a@b.org");
        assert_eq!(invitation.inviter_id, "u:cam:simon");
        assert_eq!(invitation.created_at, invitation.updated_at);
    }

    #[test]
    fn test_reinvite_changes_role() {
        let mut invitation = Invitation::new("g:cam:team", "a@b.org", "u:cam:simon", "member");
        invitation.reinvite("u:cam:bert", "manager");

        assert_eq!(invitation.role, "manager");
        assert_eq!(invitation.inviter_id, "u:cam:bert");
        assert!(invitation.updated_at >= invitation.created_at);
    }

    #[test]
    fn test_accept_yields_membership() {
        let invitation = Invitation::new("f:cam:folder", "a@b.org", "u:cam:simon", "manager");
        let member = invitation.accept("u:cam:a");

        assert_eq!(member, MemberRole::new("u:cam:a", "manager"));
    }
}
