//! # Role Resolution
//!
//! Computes the role a principal effectively holds on a resource.
//!
//! Roles come from three places:
//! - **Direct**: an edge from the principal to the resource
//! - **Transitive**: an edge from any group the principal reaches through
//!   group-membership chains
//! - **Implicit**: tenant administration, being the resource itself, and the
//!   resource's visibility
//!
//! The most privileged role of the resource kind's priority list wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use platform_org::{Principal, Resource, ResourceKind, RolePriority, ViewerContext, Visibility};

use crate::graph::MembershipGraph;
use crate::registry::TenantRegistry;

/// Node attributes of a role graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberNode {
    /// Kind derived from the id, if the id is well-formed
    pub kind: Option<ResourceKind>,
}

impl MemberNode {
    /// Attributes for the node with the given id.
    pub fn for_id(id: &str) -> Self {
        Self {
            kind: ResourceKind::from_id(id),
        }
    }
}

/// Edge attributes of a role graph.
///
/// Group-membership edges that only carry reachability have no role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipAttrs {
    /// Role granted by the edge
    pub role: Option<String>,
}

impl MembershipAttrs {
    /// An edge granting `role` on its target.
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }
}

/// Graph of principals, groups and resources used for one resolution.
pub type RoleGraph = MembershipGraph<MemberNode, MembershipAttrs>;

/// Resolve the most privileged role a principal holds on a resource.
///
/// Every node reachable from the principal (the principal included) is checked
/// for an edge to the resource. Roles outside `priority` are ignored.
///
/// # Example
///
/// ```
/// use platform_org::RolePriority;
/// use platform_rbac::resolver::{resolve_effective_role, MembershipAttrs, RoleGraph};
///
/// let mut graph = RoleGraph::new();
/// graph.add_edge("u:cam:nico", "c:cam:doc", MembershipAttrs::with_role("viewer"));
/// graph.add_edge("u:cam:nico", "g:cam:team", MembershipAttrs::default());
/// graph.add_edge("g:cam:team", "c:cam:doc", MembershipAttrs::with_role("manager"));
///
/// let priority = RolePriority::new(["viewer", "manager"]);
/// let role = resolve_effective_role(&graph, "u:cam:nico", "c:cam:doc", &priority);
/// assert_eq!(role.as_deref(), Some("manager"));
/// ```
pub fn resolve_effective_role(
    graph: &RoleGraph,
    principal_id: &str,
    resource_id: &str,
    priority: &RolePriority,
) -> Option<String> {
    let mut granted = Vec::new();

    for node in graph.traverse_out(principal_id) {
        if node.id == resource_id {
            continue;
        }

        let Some(role) = graph
            .get_edge(&node.id, resource_id)
            .and_then(|edge| edge.attrs.role.as_deref())
        else {
            continue;
        };

        if priority.contains(role) {
            granted.push(role);
        } else {
            debug!(
                principal_id = %principal_id,
                resource_id = %resource_id,
                via = %node.id,
                role = %role,
                "Ignoring role outside the priority list"
            );
        }
    }

    priority.highest_of(granted).map(str::to_string)
}

/// The role on the direct edge from a principal to a resource, if any.
pub fn direct_role<'g>(graph: &'g RoleGraph, principal_id: &str, resource_id: &str) -> Option<&'g str> {
    graph
        .get_edge(principal_id, resource_id)
        .and_then(|edge| edge.attrs.role.as_deref())
}

/// Outcome of implicit role resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicitRole {
    /// Most privileged role the viewer holds, if any
    pub role: Option<String>,

    /// Whether the viewer may interact with the resource (share with it,
    /// join it, message it)
    pub can_interact: bool,
}

impl ImplicitRole {
    /// No role and no interaction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether a role was resolved.
    pub fn has_role(&self) -> bool {
        self.role.is_some()
    }
}

/// Resolves implicit roles against a tenant registry.
#[derive(Clone, Copy)]
pub struct RoleResolver<'a> {
    registry: &'a dyn TenantRegistry,
}

impl<'a> RoleResolver<'a> {
    /// Create a resolver backed by the given registry.
    pub fn new(registry: &'a dyn TenantRegistry) -> Self {
        Self { registry }
    }

    /// The registry this resolver consults.
    pub fn registry(&self) -> &'a dyn TenantRegistry {
        self.registry
    }

    /// Check whether the user is the owner itself or administers its tenant.
    pub fn has_administrative_standing(&self, user: &Principal, owner: &Resource) -> bool {
        user.id == owner.id || self.registry.is_administrator_of(user, &owner.tenant_alias)
    }

    /// Resolve the implicit role of the viewer on `owner`.
    ///
    /// `graph` must contain the viewer's group closure and the owner's
    /// membership edges.
    pub fn resolve_implicit_role(
        &self,
        ctx: &ViewerContext,
        graph: &RoleGraph,
        owner: &Resource,
        priority: &RolePriority,
    ) -> ImplicitRole {
        let lowest = priority.lowest().map(str::to_string);

        let Some(user) = ctx.user() else {
            let role = if owner.visibility == Visibility::Public {
                lowest
            } else {
                None
            };
            return ImplicitRole {
                role,
                can_interact: false,
            };
        };

        if self.has_administrative_standing(user, owner) {
            return ImplicitRole {
                role: priority.highest().map(str::to_string),
                can_interact: true,
            };
        }

        let member_role = resolve_effective_role(graph, &user.id, &owner.id, priority);
        let visibility_role = match owner.visibility {
            Visibility::Public => lowest,
            Visibility::LoggedIn if self.registry.is_logged_in(ctx, &owner.tenant_alias) => lowest,
            _ => None,
        };

        let tenants_interact = self
            .registry
            .can_interact(&user.tenant_alias, &owner.tenant_alias);
        let can_interact = member_role.is_some()
            || (tenants_interact && (visibility_role.is_some() || owner.is_joinable()));

        let role = priority
            .highest_of(member_role.as_deref().into_iter().chain(visibility_role.as_deref()))
            .map(str::to_string);

        debug!(
            user_id = %user.id,
            owner_id = %owner.id,
            role = ?role,
            can_interact,
            "Resolved implicit role"
        );

        ImplicitRole { role, can_interact }
    }
}
