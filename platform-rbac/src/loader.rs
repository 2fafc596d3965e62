//! Role graph loading.
//!
//! Builds the membership graph for one resolution from the stores: the
//! viewer's group closure first, then the role edges of the resources in
//! question that start inside that closure.

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, warn};

use platform_org::{DirectRole, Invitation, MemberRole};

use crate::cache::ResolutionCache;
use crate::config::EngineConfig;
use crate::error::{AuthzError, AuthzResult};
use crate::resolver::{MemberNode, MembershipAttrs, RoleGraph};
use crate::store::{InvitationStore, MembershipStore, Page, PageRequest};

/// Fetch every page of a listing.
///
/// Fails with `UpstreamFailure` when the store keeps returning tokens past
/// `config.max_pages`.
pub async fn collect_pages<T, F, Fut>(config: &EngineConfig, listing: &str, mut fetch: F) -> AuthzResult<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = AuthzResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token = None;

    for _ in 0..config.max_pages {
        let page = fetch(PageRequest {
            token: token.take(),
            limit: config.page_size,
        })
        .await?;
        items.extend(page.items);

        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }

    warn!(listing = %listing, max_pages = config.max_pages, "Listing exceeded page limit");
    Err(AuthzError::UpstreamFailure(format!(
        "{} returned more than {} pages",
        listing, config.max_pages
    )))
}

/// Group memberships reachable from a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAncestry {
    /// `(member, group, role)` edges in discovery order
    pub edges: Vec<(String, String, String)>,
    /// Whether groups beyond `max_group_depth` were left out
    pub truncated: bool,
}

/// Loads listings through the session cache and assembles role graphs.
pub struct MembershipLoader<'a> {
    store: &'a dyn MembershipStore,
    invitation_store: &'a dyn InvitationStore,
    config: &'a EngineConfig,
    cache: &'a mut ResolutionCache,
}

impl<'a> MembershipLoader<'a> {
    /// Create a loader.
    pub fn new(
        store: &'a dyn MembershipStore,
        invitation_store: &'a dyn InvitationStore,
        config: &'a EngineConfig,
        cache: &'a mut ResolutionCache,
    ) -> Self {
        Self {
            store,
            invitation_store,
            config,
            cache,
        }
    }

    /// Groups a principal is a direct member of.
    pub async fn group_memberships(&mut self, principal_id: &str) -> AuthzResult<Vec<DirectRole>> {
        if let Some(groups) = self.cache.group_memberships(principal_id) {
            return Ok(groups);
        }

        let store = self.store;
        let groups = collect_pages(self.config, "group memberships", |page| {
            store.get_group_memberships_of(principal_id, page)
        })
        .await?;

        self.cache.put_group_memberships(principal_id, groups.clone());
        Ok(groups)
    }

    /// Principals holding a role directly on a resource.
    pub async fn all_roles(&mut self, resource_id: &str) -> AuthzResult<Vec<MemberRole>> {
        if let Some(members) = self.cache.members(resource_id) {
            return Ok(members);
        }

        let store = self.store;
        let members = collect_pages(self.config, "resource roles", |page| {
            store.get_all_roles(resource_id, page)
        })
        .await?;

        self.cache.put_members(resource_id, members.clone());
        Ok(members)
    }

    /// Pending invitations on a resource.
    pub async fn invitations(&mut self, resource_id: &str) -> AuthzResult<Vec<Invitation>> {
        if let Some(invitations) = self.cache.invitations(resource_id) {
            return Ok(invitations);
        }

        let store = self.invitation_store;
        let invitations = collect_pages(self.config, "invitations", |page| {
            store.get_invitations(resource_id, page)
        })
        .await?;

        self.cache.put_invitations(resource_id, invitations.clone());
        Ok(invitations)
    }

    /// Membership edges from a principal into every group it reaches.
    ///
    /// Breadth-first up to `max_group_depth` hops. Each group is expanded once,
    /// so cyclic group chains terminate.
    pub async fn group_ancestry(&mut self, principal_id: &str) -> AuthzResult<GroupAncestry> {
        let mut edges = Vec::new();
        let mut visited = HashSet::from([principal_id.to_string()]);
        let mut frontier = vec![principal_id.to_string()];

        for _ in 0..self.config.max_group_depth {
            if frontier.is_empty() {
                break;
            }

            let mut next = Vec::new();
            for member in frontier {
                for group in self.group_memberships(&member).await? {
                    if visited.insert(group.resource_id.clone()) {
                        next.push(group.resource_id.clone());
                    }
                    edges.push((member.clone(), group.resource_id, group.role));
                }
            }
            frontier = next;
        }

        // The last frontier is only truncated if one of its groups has a parent
        // that was never reached.
        let mut truncated = false;
        for member in &frontier {
            let groups = self.group_memberships(member).await?;
            if groups.iter().any(|group| !visited.contains(&group.resource_id)) {
                truncated = true;
                break;
            }
        }

        if truncated {
            warn!(
                principal_id = %principal_id,
                max_group_depth = self.config.max_group_depth,
                "Group ancestry truncated"
            );
        }

        Ok(GroupAncestry { edges, truncated })
    }

    /// Build the role graph of a principal against a set of resources.
    ///
    /// Without a principal only the resource nodes are added: anonymous
    /// viewers hold no membership roles.
    pub async fn build_graph(&mut self, principal_id: Option<&str>, resource_ids: &[&str]) -> AuthzResult<RoleGraph> {
        let mut graph = RoleGraph::new();
        let mut closure = HashSet::new();

        if let Some(principal_id) = principal_id {
            graph.add_node(principal_id, MemberNode::for_id(principal_id));
            closure.insert(principal_id.to_string());

            for (member, group, role) in self.group_ancestry(principal_id).await?.edges {
                graph.add_node(group.as_str(), MemberNode::for_id(&group));
                closure.insert(group.clone());
                graph.add_edge(member, group, MembershipAttrs::with_role(role));
            }
        }

        for resource_id in resource_ids {
            graph.add_node(*resource_id, MemberNode::for_id(resource_id));
            if closure.is_empty() {
                continue;
            }

            for member in self.all_roles(resource_id).await? {
                if closure.contains(&member.principal_id) {
                    graph.add_edge(member.principal_id, *resource_id, MembershipAttrs::with_role(member.role));
                }
            }
        }

        debug!(
            principal_id = ?principal_id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built role graph"
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMembershipStore;
    use crate::resolver::resolve_effective_role;
    use platform_org::RolePriority;

    fn config() -> EngineConfig {
        EngineConfig {
            page_size: 1,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_collect_pages_respects_limit() {
        let store = MemoryMembershipStore::with_page_size(1);
        for member in ["a", "b", "c"] {
            store.grant("g:cam:team", &format!("u:cam:{}", member), "member").await;
        }

        let mut config = config();
        let members = collect_pages(&config, "roles", |page| store.get_all_roles("g:cam:team", page))
            .await
            .unwrap();
        assert_eq!(members.len(), 3);

        config.max_pages = 2;
        let err = collect_pages(&config, "roles", |page| store.get_all_roles("g:cam:team", page))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::UpstreamFailure(_)));
    }

    #[tokio::test]
    async fn test_group_ancestry_with_cycle() {
        let store = MemoryMembershipStore::new();
        store.grant("g:cam:a", "u:cam:nico", "member").await;
        store.grant("g:cam:b", "g:cam:a", "member").await;
        store.grant("g:cam:a", "g:cam:b", "member").await;

        let config = config();
        let mut cache = ResolutionCache::new();
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);

        let ancestry = loader.group_ancestry("u:cam:nico").await.unwrap();
        assert!(!ancestry.truncated);
        assert_eq!(
            ancestry.edges,
            vec![
                ("u:cam:nico".to_string(), "g:cam:a".to_string(), "member".to_string()),
                ("g:cam:a".to_string(), "g:cam:b".to_string(), "member".to_string()),
                ("g:cam:b".to_string(), "g:cam:a".to_string(), "member".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_group_ancestry_depth_limit() {
        let store = MemoryMembershipStore::new();
        store.grant("g:cam:1", "u:cam:nico", "member").await;
        store.grant("g:cam:2", "g:cam:1", "member").await;
        store.grant("g:cam:3", "g:cam:2", "member").await;

        let config = EngineConfig {
            max_group_depth: 2,
            ..EngineConfig::default()
        };
        let mut cache = ResolutionCache::new();
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);

        let ancestry = loader.group_ancestry("u:cam:nico").await.unwrap();
        let groups: Vec<_> = ancestry.edges.iter().map(|(_, group, _)| group.as_str()).collect();
        assert_eq!(groups, vec!["g:cam:1", "g:cam:2"]);
        assert!(ancestry.truncated);
    }

    #[tokio::test]
    async fn test_chain_as_long_as_depth_limit_is_complete() {
        let store = MemoryMembershipStore::new();
        store.grant("g:cam:1", "u:cam:nico", "member").await;
        store.grant("g:cam:2", "g:cam:1", "member").await;

        let config = EngineConfig {
            max_group_depth: 2,
            ..EngineConfig::default()
        };
        let mut cache = ResolutionCache::new();
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);

        let ancestry = loader.group_ancestry("u:cam:nico").await.unwrap();
        assert_eq!(ancestry.edges.len(), 2);
        assert!(!ancestry.truncated);
    }

    #[tokio::test]
    async fn test_build_graph_resolves_transitive_role() {
        let store = MemoryMembershipStore::with_page_size(1);
        store.grant("g:cam:team", "u:cam:nico", "member").await;
        store.grant("c:cam:doc", "g:cam:team", "manager").await;
        store.grant("c:cam:doc", "u:cam:nico", "viewer").await;
        store.grant("c:cam:doc", "u:cam:simon", "viewer").await;

        let config = config();
        let mut cache = ResolutionCache::new();
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);

        let graph = loader.build_graph(Some("u:cam:nico"), &["c:cam:doc"]).await.unwrap();
        assert!(graph.get_edge("u:cam:simon", "c:cam:doc").is_none());
        assert_eq!(graph.edge_count(), 3);

        let priority = RolePriority::new(["viewer", "editor", "manager"]);
        let role = resolve_effective_role(&graph, "u:cam:nico", "c:cam:doc", &priority);
        assert_eq!(role.as_deref(), Some("manager"));
    }

    #[tokio::test]
    async fn test_anonymous_graph_skips_store() {
        let store = MemoryMembershipStore::new();
        store.grant("c:cam:doc", "u:cam:nico", "viewer").await;

        let config = config();
        let mut cache = ResolutionCache::new();
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);

        let graph = loader.build_graph(None, &["c:cam:doc"]).await.unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_listings_are_cached() {
        let store = MemoryMembershipStore::new();
        store.grant("g:cam:team", "u:cam:nico", "member").await;

        let config = config();
        let mut cache = ResolutionCache::new();
        {
            let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);
            loader.all_roles("g:cam:team").await.unwrap();
            store.revoke("g:cam:team", "u:cam:nico").await;
            let members = loader.all_roles("g:cam:team").await.unwrap();
            assert_eq!(members.len(), 1);
        }

        cache.invalidate("g:cam:team");
        let mut loader = MembershipLoader::new(&store, &store, &config, &mut cache);
        assert!(loader.all_roles("g:cam:team").await.unwrap().is_empty());
    }
}
