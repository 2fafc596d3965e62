//! # Invitation Diffs
//!
//! Resources can be shared with email addresses that have no account yet.
//! The pending grants form an email-keyed role list; a share request proposes
//! changes to it, and the diff tells the caller which invitations to create,
//! re-target or delete (and which emails to notify).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use platform_org::invitation::normalize_email;
use platform_org::{Invitation, RolePriority};

use crate::error::{AuthzError, AuthzResult};

/// A proposed change for one email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleChange {
    /// Grant (or re-target to) the given role
    Role(String),
    /// Revoke the pending grant
    Removed,
}

impl RoleChange {
    /// Grant the given role.
    pub fn role(role: impl Into<String>) -> Self {
        RoleChange::Role(role.into())
    }
}

/// Options for diff computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Ignore demotions and removals
    pub promote_only: bool,
}

impl DiffOptions {
    /// Only keep additions and promotions.
    pub fn promote_only() -> Self {
        Self { promote_only: true }
    }
}

/// What happens to one email's pending grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// New invitation
    Added,
    /// Existing invitation moves to a more privileged role
    Promoted,
    /// Existing invitation moves to a less privileged role
    Demoted,
    /// Existing invitation is revoked
    Removed,
}

/// One effective change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationChange {
    /// Normalized email
    pub email: String,
    /// Kind of change
    pub kind: ChangeKind,
    /// Role before the change
    pub before: Option<String>,
    /// Role after the change
    pub after: Option<String>,
}

/// Result of applying proposed changes to a pending invitation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationDiff {
    /// Effective changes, ordered by email
    pub changes: Vec<InvitationChange>,
    /// Email → role before the changes
    pub before: BTreeMap<String, String>,
    /// Email → role after the changes
    pub after: BTreeMap<String, String>,
}

impl InvitationDiff {
    /// Check whether anything changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes of the given kind.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &InvitationChange> + '_ {
        self.changes.iter().filter(move |change| change.kind == kind)
    }

    /// Emails that should receive an invitation email.
    pub fn emails_to_notify(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|change| matches!(change.kind, ChangeKind::Added | ChangeKind::Promoted))
            .map(|change| change.email.as_str())
            .collect()
    }
}

/// Email → role map of a resource's pending invitations.
pub fn current_roles(invitations: &[Invitation]) -> BTreeMap<String, String> {
    invitations
        .iter()
        .map(|invitation| (normalize_email(&invitation.email), invitation.role.clone()))
        .collect()
}

/// Compute the effect of `proposed` on the `current` invitation roles.
///
/// Unchanged roles and removals of emails without an invitation are dropped.
/// Invalid role names and addresses without `@` fail the whole computation.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use platform_org::RolePriority;
/// use platform_rbac::invitations::{compute_role_changes, ChangeKind, DiffOptions, RoleChange};
///
/// let current = BTreeMap::from([("a@oae.com".to_string(), "viewer".to_string())]);
/// let proposed = BTreeMap::from([
///     ("a@oae.com".to_string(), RoleChange::Removed),
///     ("b@oae.com".to_string(), RoleChange::role("manager")),
/// ]);
/// let priority = RolePriority::new(["viewer", "manager"]);
///
/// let diff = compute_role_changes(&current, &proposed, &priority, DiffOptions::promote_only()).unwrap();
/// assert_eq!(diff.changes.len(), 1);
/// assert_eq!(diff.changes[0].email, "b@oae.com");
/// assert_eq!(diff.changes[0].kind, ChangeKind::Added);
/// ```
pub fn compute_role_changes(
    current: &BTreeMap<String, String>,
    proposed: &BTreeMap<String, RoleChange>,
    priority: &RolePriority,
    opts: DiffOptions,
) -> AuthzResult<InvitationDiff> {
    let before: BTreeMap<String, String> = current
        .iter()
        .map(|(email, role)| (normalize_email(email), role.clone()))
        .collect();
    let proposed = normalize_proposed(proposed, priority)?;

    let mut after = before.clone();
    let mut changes = Vec::new();

    for (email, change) in proposed {
        let prior = before.get(&email);

        let (kind, next) = match (change, prior) {
            (RoleChange::Role(role), None) => (ChangeKind::Added, Some(role)),
            (RoleChange::Role(role), Some(prior)) if role == prior => continue,
            (RoleChange::Role(role), Some(prior)) => {
                if priority.rank(role) > priority.rank(prior) {
                    (ChangeKind::Promoted, Some(role))
                } else {
                    (ChangeKind::Demoted, Some(role))
                }
            }
            (RoleChange::Removed, None) => continue,
            (RoleChange::Removed, Some(_)) => (ChangeKind::Removed, None),
        };

        if opts.promote_only && matches!(kind, ChangeKind::Demoted | ChangeKind::Removed) {
            debug!(email = %email, kind = ?kind, "Skipping change in promote-only mode");
            continue;
        }

        match next {
            Some(role) => after.insert(email.clone(), role.clone()),
            None => after.remove(&email),
        };

        changes.push(InvitationChange {
            before: prior.cloned(),
            after: next.cloned(),
            email,
            kind,
        });
    }

    Ok(InvitationDiff {
        changes,
        before,
        after,
    })
}

fn normalize_proposed<'p>(
    proposed: &'p BTreeMap<String, RoleChange>,
    priority: &RolePriority,
) -> AuthzResult<BTreeMap<String, &'p RoleChange>> {
    let mut normalized = BTreeMap::new();

    for (email, change) in proposed {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AuthzError::InvalidArgument(format!("invalid email address: {}", email)));
        }

        if let RoleChange::Role(role) = change {
            if !priority.contains(role) {
                return Err(AuthzError::InvalidArgument(format!(
                    "invalid role {} (expected one of {})",
                    role, priority
                )));
            }
        }

        if let Some(previous) = normalized.insert(email.clone(), change) {
            if previous != change {
                return Err(AuthzError::InvalidArgument(format!(
                    "conflicting changes for {}",
                    email
                )));
            }
        }
    }

    Ok(normalized)
}
