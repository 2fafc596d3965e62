//! Request-scoped resolution cache.
//!
//! Memoizes store listings for the lifetime of one `AuthzSession`. Nothing is
//! shared between sessions; a caller that mutates memberships mid-request
//! invalidates the affected ids explicitly.

use std::collections::HashMap;

use platform_org::{DirectRole, Invitation, MemberRole, ResourceKind};

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the store
    pub misses: u64,
}

/// Memoized listings keyed by principal or resource id.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    /// Principal id → groups it is a direct member of
    group_memberships: HashMap<String, Vec<DirectRole>>,
    /// Resource id → principals holding a role on it
    members: HashMap<String, Vec<MemberRole>>,
    /// Resource id → pending invitations
    invitations: HashMap<String, Vec<Invitation>>,
    stats: CacheStats,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached group memberships of a principal.
    pub fn group_memberships(&mut self, principal_id: &str) -> Option<Vec<DirectRole>> {
        let cached = self.group_memberships.get(principal_id).cloned();
        self.record(cached.is_some());
        cached
    }

    /// Remember the group memberships of a principal.
    pub fn put_group_memberships(&mut self, principal_id: &str, groups: Vec<DirectRole>) {
        self.group_memberships.insert(principal_id.to_string(), groups);
    }

    /// Cached members of a resource.
    pub fn members(&mut self, resource_id: &str) -> Option<Vec<MemberRole>> {
        let cached = self.members.get(resource_id).cloned();
        self.record(cached.is_some());
        cached
    }

    /// Remember the members of a resource.
    pub fn put_members(&mut self, resource_id: &str, members: Vec<MemberRole>) {
        self.members.insert(resource_id.to_string(), members);
    }

    /// Cached pending invitations of a resource.
    pub fn invitations(&mut self, resource_id: &str) -> Option<Vec<Invitation>> {
        let cached = self.invitations.get(resource_id).cloned();
        self.record(cached.is_some());
        cached
    }

    /// Remember the pending invitations of a resource.
    pub fn put_invitations(&mut self, resource_id: &str, invitations: Vec<Invitation>) {
        self.invitations.insert(resource_id.to_string(), invitations);
    }

    /// Forget everything known about an id.
    ///
    /// Also drops the group listings that may change along with it: those of
    /// the cached members of the id and those that mention it. Invalidating a
    /// group drops every principal's group listing, since a principal that
    /// joined the group is not yet recorded anywhere in the cache.
    pub fn invalidate(&mut self, id: &str) {
        if let Some(members) = self.members.remove(id) {
            for member in members {
                self.group_memberships.remove(&member.principal_id);
            }
        }
        self.group_memberships.remove(id);
        self.invitations.remove(id);

        if ResourceKind::from_id(id) == Some(ResourceKind::Group) {
            self.group_memberships.clear();
        } else {
            self.group_memberships
                .retain(|_, groups| !groups.iter().any(|group| group.resource_id == id));
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.group_memberships.clear();
        self.members.clear();
        self.invitations.clear();
    }

    /// Number of cached listings.
    pub fn len(&self) -> usize {
        self.group_memberships.len() + self.members.len() + self.invitations.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit and miss counts since creation.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn record(&mut self, hit: bool) {
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
    }
}
