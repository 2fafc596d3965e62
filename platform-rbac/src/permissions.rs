//! # Permission Checks
//!
//! Pure capability decisions over a prepared role graph. The checker resolves
//! the viewer's implicit role on the target, then hands the decision to the
//! rules of the target's kind.

use serde::{Deserialize, Serialize};
use tracing::debug;

use platform_org::{Resource, ViewerContext};

use crate::actions::Capability;
use crate::error::{AuthzError, AuthzResult};
use crate::resolver::{ImplicitRole, RoleGraph, RoleResolver};
use crate::resources::{capabilities_for, AccessRequest};

/// Per-target outcome of a bulk interaction check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    /// Ids the viewer may interact with
    pub allowed: Vec<String>,
    /// Ids the viewer may not interact with, with the reason
    pub denied: Vec<(String, AuthzError)>,
}

impl InteractionReport {
    /// Check whether every target was allowed.
    pub fn all_allowed(&self) -> bool {
        self.denied.is_empty()
    }

    /// Ids of the denied targets.
    pub fn denied_ids(&self) -> Vec<&str> {
        self.denied.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Collapse into a single result.
    ///
    /// Any denial fails the whole batch with `Forbidden` naming every denied id.
    pub fn into_result(self) -> AuthzResult<Vec<String>> {
        if self.denied.is_empty() {
            return Ok(self.allowed);
        }
        Err(AuthzError::Forbidden(format!(
            "cannot interact with: {}",
            self.denied_ids().join(", ")
        )))
    }
}

/// Capability checker backed by a role resolver.
#[derive(Clone, Copy)]
pub struct PermissionChecker<'a> {
    resolver: RoleResolver<'a>,
}

impl<'a> PermissionChecker<'a> {
    /// Create a checker.
    pub fn new(resolver: RoleResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Resolve the viewer's implicit role on a target.
    pub fn implicit_role(&self, ctx: &ViewerContext, graph: &RoleGraph, target: &Resource) -> ImplicitRole {
        self.resolver
            .resolve_implicit_role(ctx, graph, target, &target.role_priority())
    }

    /// Check a capability.
    pub fn check(
        &self,
        capability: Capability,
        ctx: &ViewerContext,
        graph: &RoleGraph,
        target: &Resource,
    ) -> AuthzResult<()> {
        let implicit = self.implicit_role(ctx, graph, target);
        let administrative = ctx
            .user()
            .map(|user| self.resolver.has_administrative_standing(user, target))
            .unwrap_or(false);

        let req = AccessRequest {
            ctx,
            target,
            implicit: &implicit,
            administrative,
        };
        let outcome = capabilities_for(target.kind).check(capability, &req);

        debug!(
            viewer_id = ?ctx.user_id(),
            target_id = %target.id,
            capability = %capability,
            allowed = outcome.is_ok(),
            "Checked capability"
        );

        outcome
    }

    /// Check whether the viewer may read the target.
    pub fn can_view(&self, ctx: &ViewerContext, graph: &RoleGraph, target: &Resource) -> AuthzResult<()> {
        self.check(Capability::View, ctx, graph, target)
    }

    /// Check whether the viewer may administer the target.
    pub fn can_manage(&self, ctx: &ViewerContext, graph: &RoleGraph, target: &Resource) -> AuthzResult<()> {
        self.check(Capability::Manage, ctx, graph, target)
    }

    /// Check whether the viewer may act on the target.
    pub fn can_interact(&self, ctx: &ViewerContext, graph: &RoleGraph, target: &Resource) -> AuthzResult<()> {
        self.check(Capability::Interact, ctx, graph, target)
    }

    /// Check interaction with every target, reporting per target.
    pub fn can_interact_all(
        &self,
        ctx: &ViewerContext,
        graph: &RoleGraph,
        targets: &[Resource],
    ) -> InteractionReport {
        let mut report = InteractionReport::default();

        for target in targets {
            match self.can_interact(ctx, graph, target) {
                Ok(()) => report.allowed.push(target.id.clone()),
                Err(err) => report.denied.push((target.id.clone(), err)),
            }
        }

        report
    }
}
