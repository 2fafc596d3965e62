//! Authorization service and request-scoped sessions.
//!
//! `AuthzService` holds the collaborators and configuration and is shared
//! across requests. Each request opens an `AuthzSession`, which loads the
//! role graphs it needs through its own `ResolutionCache` and answers
//! decisions with the pure engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use platform_org::{Resource, ResourceKind, ViewerContext, Visibility};

use crate::cache::ResolutionCache;
use crate::config::{ConfigError, EngineConfig};
use crate::error::AuthzResult;
use crate::invitations::{compute_role_changes, current_roles, DiffOptions, InvitationDiff, RoleChange};
use crate::library::{self, LibraryAccess};
use crate::loader::MembershipLoader;
use crate::memory::MemoryMembershipStore;
use crate::permissions::{InteractionReport, PermissionChecker};
use crate::registry::TenantRegistry;
use crate::resolver::{self, ImplicitRole, RoleGraph, RoleResolver};
use crate::store::{InvitationStore, MembershipStore};

/// Shared entry point of the engine.
#[derive(Clone)]
pub struct AuthzService {
    store: Arc<dyn MembershipStore>,
    invitations: Arc<dyn InvitationStore>,
    registry: Arc<dyn TenantRegistry>,
    config: EngineConfig,
}

impl AuthzService {
    /// Create a service, validating the configuration.
    pub fn new(
        store: Arc<dyn MembershipStore>,
        invitations: Arc<dyn InvitationStore>,
        registry: Arc<dyn TenantRegistry>,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            invitations,
            registry,
            config,
        })
    }

    /// Create a service over an in-memory store.
    pub fn in_memory(
        store: MemoryMembershipStore,
        registry: Arc<dyn TenantRegistry>,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        let store = Arc::new(store);
        Self::new(store.clone(), store, registry, config)
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The tenant registry.
    pub fn registry(&self) -> &dyn TenantRegistry {
        self.registry.as_ref()
    }

    /// Open a session for one request.
    pub fn session(&self) -> AuthzSession<'_> {
        AuthzSession {
            service: self,
            cache: ResolutionCache::new(),
        }
    }
}

/// Decisions for one request.
pub struct AuthzSession<'a> {
    service: &'a AuthzService,
    cache: ResolutionCache,
}

impl<'a> AuthzSession<'a> {
    /// The session cache.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Forget cached listings that mention `id`.
    pub fn invalidate(&mut self, id: &str) {
        self.cache.invalidate(id);
    }

    /// Forget every cached listing.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn loader(&mut self) -> MembershipLoader<'_> {
        MembershipLoader::new(
            self.service.store.as_ref(),
            self.service.invitations.as_ref(),
            &self.service.config,
            &mut self.cache,
        )
    }

    fn resolver(&self) -> RoleResolver<'a> {
        RoleResolver::new(self.service.registry.as_ref())
    }

    fn checker(&self) -> PermissionChecker<'a> {
        PermissionChecker::new(self.resolver())
    }

    async fn graph_for(&mut self, principal_id: Option<&str>, resource_ids: &[&str]) -> AuthzResult<RoleGraph> {
        self.loader().build_graph(principal_id, resource_ids).await
    }

    /// Check whether the viewer may read the target.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), target_id = %target.id))]
    pub async fn can_view(&mut self, ctx: &ViewerContext, target: &Resource) -> AuthzResult<()> {
        let graph = self.graph_for(ctx.user_id(), &[target.id.as_str()]).await?;
        self.checker().can_view(ctx, &graph, target)
    }

    /// Check whether the viewer may administer the target.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), target_id = %target.id))]
    pub async fn can_manage(&mut self, ctx: &ViewerContext, target: &Resource) -> AuthzResult<()> {
        let graph = self.graph_for(ctx.user_id(), &[target.id.as_str()]).await?;
        self.checker().can_manage(ctx, &graph, target)
    }

    /// Check whether the viewer may act on the target.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), target_id = %target.id))]
    pub async fn can_interact(&mut self, ctx: &ViewerContext, target: &Resource) -> AuthzResult<()> {
        let graph = self.graph_for(ctx.user_id(), &[target.id.as_str()]).await?;
        self.checker().can_interact(ctx, &graph, target)
    }

    /// Check interaction with every target.
    ///
    /// Denials are reported per target; only store failures fail the call.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), targets = targets.len()))]
    pub async fn can_interact_all(
        &mut self,
        ctx: &ViewerContext,
        targets: &[Resource],
    ) -> AuthzResult<InteractionReport> {
        let ids: Vec<&str> = targets.iter().map(|target| target.id.as_str()).collect();
        let graph = self.graph_for(ctx.user_id(), &ids).await?;
        let report = self.checker().can_interact_all(ctx, &graph, targets);

        debug!(
            allowed = report.allowed.len(),
            denied = report.denied.len(),
            "Checked bulk interaction"
        );
        Ok(report)
    }

    /// Resolve the most privileged membership role a principal holds on a
    /// resource.
    #[instrument(skip_all, fields(principal_id = %principal_id, resource_id = %resource.id))]
    pub async fn resolve_effective_role(
        &mut self,
        principal_id: &str,
        resource: &Resource,
    ) -> AuthzResult<Option<String>> {
        let graph = self.graph_for(Some(principal_id), &[resource.id.as_str()]).await?;
        Ok(resolver::resolve_effective_role(
            &graph,
            principal_id,
            &resource.id,
            &resource.role_priority(),
        ))
    }

    /// Resolve the viewer's implicit role on `owner`.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), owner_id = %owner.id))]
    pub async fn resolve_implicit_role(&mut self, ctx: &ViewerContext, owner: &Resource) -> AuthzResult<ImplicitRole> {
        let graph = self.graph_for(ctx.user_id(), &[owner.id.as_str()]).await?;
        Ok(self
            .resolver()
            .resolve_implicit_role(ctx, &graph, owner, &owner.role_priority()))
    }

    /// Determine the bucket a resource is filed into in a library.
    pub fn resolve_library_bucket_visibility(&self, library_owner_id: &str, resource: &Resource) -> AuthzResult<Visibility> {
        library::resolve_library_bucket_visibility(library_owner_id, resource)
    }

    /// Determine which bucket of `owner`'s library the viewer may read.
    #[instrument(skip_all, fields(viewer_id = ?ctx.user_id(), owner_id = %owner.id))]
    pub async fn resolve_target_library_access(
        &mut self,
        ctx: &ViewerContext,
        owner: &Resource,
    ) -> AuthzResult<LibraryAccess> {
        let graph = self.graph_for(ctx.user_id(), &[owner.id.as_str()]).await?;
        library::resolve_target_library_access(&self.resolver(), ctx, &graph, owner)
    }

    /// Compute the effect of `proposed` on a resource's pending invitations.
    ///
    /// `resource_id` is `None` while the resource is being created, in which
    /// case there are no pending invitations yet.
    #[instrument(skip_all, fields(kind = %kind.as_str(), resource_id = ?resource_id))]
    pub async fn compute_invitation_roles_after_changes(
        &mut self,
        kind: ResourceKind,
        resource_id: Option<&str>,
        proposed: &BTreeMap<String, RoleChange>,
        opts: DiffOptions,
    ) -> AuthzResult<InvitationDiff> {
        let current = match resource_id {
            Some(resource_id) => current_roles(&self.loader().invitations(resource_id).await?),
            None => BTreeMap::new(),
        };

        compute_role_changes(&current, proposed, &kind.role_priority(), opts)
    }
}
