//! Membership and invitation stores
//!
//! The engine never persists anything. It reads memberships and pending
//! invitations through these traits, one page at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use platform_org::{DirectRole, Invitation, MemberRole, ResourceKind};

use crate::error::AuthzResult;

/// Request for one page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Token returned with the previous page, `None` for the first page
    pub token: Option<String>,
    /// Maximum number of items wanted
    pub limit: u32,
}

impl PageRequest {
    /// Request the first page.
    pub fn first(limit: u32) -> Self {
        Self { token: None, limit }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items of this page
    pub items: Vec<T>,
    /// Token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// The last page of a listing.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Source of membership edges.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Resources the principal holds a role on directly, optionally filtered
    /// by kind.
    async fn get_direct_roles(
        &self,
        principal_id: &str,
        kind: Option<ResourceKind>,
        page: PageRequest,
    ) -> AuthzResult<Page<DirectRole>>;

    /// Principals holding a role directly on the resource.
    async fn get_all_roles(&self, resource_id: &str, page: PageRequest) -> AuthzResult<Page<MemberRole>>;

    /// Groups the principal is a direct member of.
    async fn get_group_memberships_of(
        &self,
        principal_id: &str,
        page: PageRequest,
    ) -> AuthzResult<Page<DirectRole>> {
        self.get_direct_roles(principal_id, Some(ResourceKind::Group), page)
            .await
    }
}

/// Source of pending invitations.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Pending invitations on the resource.
    async fn get_invitations(&self, resource_id: &str, page: PageRequest) -> AuthzResult<Page<Invitation>>;
}
