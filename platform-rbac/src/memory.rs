//! In-memory membership and invitation store.
//!
//! Suitable for tests and single-process deployments. Listings are ordered by
//! id and paged with offset tokens.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use platform_org::invitation::normalize_email;
use platform_org::{DirectRole, Invitation, MemberRole, ResourceKind};

use crate::error::{AuthzError, AuthzResult};
use crate::store::{InvitationStore, MembershipStore, Page, PageRequest};

/// Resource id → principal id → role
type Memberships = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory store.
///
/// # Example
///
/// ```
/// use platform_rbac::memory::MemoryMembershipStore;
/// use platform_rbac::store::{MembershipStore, PageRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryMembershipStore::new();
/// store.grant("g:cam:team", "u:cam:nico", "member").await;
///
/// let page = store
///     .get_group_memberships_of("u:cam:nico", PageRequest::first(10))
///     .await
///     .unwrap();
/// assert_eq!(page.items[0].resource_id, "g:cam:team");
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryMembershipStore {
    memberships: Arc<RwLock<Memberships>>,
    invitations: Arc<RwLock<BTreeMap<String, Vec<Invitation>>>>,
    /// Upper bound on items per page regardless of the requested limit
    page_size: usize,
}

impl Default for MemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMembershipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_page_size(usize::MAX)
    }

    /// Create an empty store that never returns more than `page_size` items
    /// per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            memberships: Arc::new(RwLock::new(BTreeMap::new())),
            invitations: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Grant (or replace) a principal's role on a resource.
    ///
    /// Group membership is a role on the group.
    pub async fn grant(&self, resource_id: &str, principal_id: &str, role: &str) {
        self.memberships
            .write()
            .await
            .entry(resource_id.to_string())
            .or_default()
            .insert(principal_id.to_string(), role.to_string());
    }

    /// Revoke a principal's role on a resource.
    pub async fn revoke(&self, resource_id: &str, principal_id: &str) -> bool {
        let mut memberships = self.memberships.write().await;
        let Some(members) = memberships.get_mut(resource_id) else {
            return false;
        };

        let removed = members.remove(principal_id).is_some();
        if members.is_empty() {
            memberships.remove(resource_id);
        }
        removed
    }

    /// Store an invitation, replacing any invitation for the same email.
    pub async fn add_invitation(&self, invitation: Invitation) {
        let mut invitations = self.invitations.write().await;
        let pending = invitations.entry(invitation.resource_id.clone()).or_default();
        pending.retain(|existing| existing.email != invitation.email);
        pending.push(invitation);
    }

    /// Remove the invitation for an email.
    pub async fn remove_invitation(&self, resource_id: &str, email: &str) -> Option<Invitation> {
        let email = normalize_email(email);
        let mut invitations = self.invitations.write().await;
        let pending = invitations.get_mut(resource_id)?;
        let position = pending.iter().position(|invitation| invitation.email == email)?;
        Some(pending.remove(position))
    }

    /// Turn an email's invitation into a membership.
    ///
    /// Returns the membership granted, if an invitation existed.
    pub async fn accept_invitation(
        &self,
        resource_id: &str,
        email: &str,
        principal_id: &str,
    ) -> Option<MemberRole> {
        let invitation = self.remove_invitation(resource_id, email).await?;
        let membership = invitation.accept(principal_id);
        self.grant(resource_id, &membership.principal_id, &membership.role)
            .await;
        Some(membership)
    }

    fn paginate<T>(&self, items: Vec<T>, page: &PageRequest) -> AuthzResult<Page<T>> {
        let offset = match page.token.as_deref() {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                AuthzError::UpstreamFailure(format!("invalid page token: {}", token))
            })?,
        };
        let limit = (page.limit as usize).clamp(1, self.page_size);

        let total = items.len();
        let end = offset.saturating_add(limit).min(total);
        let items: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
        let next_token = (end < total).then(|| end.to_string());

        Ok(Page { items, next_token })
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn get_direct_roles(
        &self,
        principal_id: &str,
        kind: Option<ResourceKind>,
        page: PageRequest,
    ) -> AuthzResult<Page<DirectRole>> {
        let roles: Vec<DirectRole> = self
            .memberships
            .read()
            .await
            .iter()
            .filter(|(resource_id, _)| {
                kind.map_or(true, |kind| ResourceKind::from_id(resource_id) == Some(kind))
            })
            .filter_map(|(resource_id, members)| {
                members
                    .get(principal_id)
                    .map(|role| DirectRole::new(resource_id.clone(), role.clone()))
            })
            .collect();

        self.paginate(roles, &page)
    }

    async fn get_all_roles(&self, resource_id: &str, page: PageRequest) -> AuthzResult<Page<MemberRole>> {
        let roles: Vec<MemberRole> = self
            .memberships
            .read()
            .await
            .get(resource_id)
            .map(|members| {
                members
                    .iter()
                    .map(|(principal_id, role)| MemberRole::new(principal_id.clone(), role.clone()))
                    .collect()
            })
            .unwrap_or_default();

        self.paginate(roles, &page)
    }
}

#[async_trait]
impl InvitationStore for MemoryMembershipStore {
    async fn get_invitations(&self, resource_id: &str, page: PageRequest) -> AuthzResult<Page<Invitation>> {
        let mut invitations = self
            .invitations
            .read()
            .await
            .get(resource_id)
            .cloned()
            .unwrap_or_default();
        invitations.sort_by(|a, b| a.email.cmp(&b.email));

        self.paginate(invitations, &page)
    }
}
