//! # Library Visibility
//!
//! A library is the collection of resources owned by, or shared with, a
//! principal or group. Every library is stored in three buckets, one per
//! visibility level, and a viewer reads the bucket it is entitled to plus
//! every less restrictive one.
//!
//! ```text
//!   private   ─ owner, tenant administrators, direct members
//!   loggedin  ─ users of the owner's tenant with implicit access
//!   public    ─ everyone with implicit access, joinable-group browsers
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use platform_org::{Resource, ResourceId, Visibility, ViewerContext};

use crate::error::{AuthzError, AuthzResult};
use crate::resolver::{direct_role, RoleGraph, RoleResolver};

/// Outcome of a library access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "access", content = "visibility", rename_all = "snake_case")]
pub enum LibraryAccess {
    /// The viewer may read the given bucket and every less restrictive one
    Granted(Visibility),
    /// The viewer may not read the library at all
    Denied,
}

impl LibraryAccess {
    /// Check whether any bucket is readable.
    pub fn is_granted(&self) -> bool {
        matches!(self, LibraryAccess::Granted(_))
    }

    /// The most restrictive readable bucket.
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            LibraryAccess::Granted(visibility) => Some(*visibility),
            LibraryAccess::Denied => None,
        }
    }

    /// Every bucket the viewer may read, most restrictive first.
    pub fn visible_buckets(&self) -> Vec<Visibility> {
        self.visibility()
            .map(|visibility| visibility.visible_buckets())
            .unwrap_or_default()
    }

    /// Convert into a result, denying with `Forbidden`.
    pub fn require(self, owner_id: &str) -> AuthzResult<Visibility> {
        self.visibility().ok_or_else(|| {
            AuthzError::Forbidden(format!("cannot access the library of {}", owner_id))
        })
    }
}

/// Determine the bucket a resource is filed into in a library.
///
/// A `loggedin` resource only makes sense to users of its own tenant, so it is
/// filed as `private` in libraries owned by another tenant's principals.
///
/// # Example
///
/// ```
/// use platform_org::{Resource, ResourceKind, Visibility};
/// use platform_rbac::library::resolve_library_bucket_visibility;
///
/// let doc = Resource::new(ResourceKind::Content, "cam", "doc", "Doc")
///     .with_visibility(Visibility::LoggedIn);
///
/// assert_eq!(resolve_library_bucket_visibility("u:cam:nico", &doc).unwrap(), Visibility::LoggedIn);
/// assert_eq!(resolve_library_bucket_visibility("u:gt:bert", &doc).unwrap(), Visibility::Private);
/// ```
pub fn resolve_library_bucket_visibility(
    library_owner_id: &str,
    resource: &Resource,
) -> AuthzResult<Visibility> {
    let owner = ResourceId::parse(library_owner_id).ok_or_else(|| {
        AuthzError::InvalidArgument(format!("malformed library owner id: {}", library_owner_id))
    })?;

    if resource.visibility == Visibility::LoggedIn && owner.tenant_alias != resource.tenant_alias {
        return Ok(Visibility::Private);
    }

    Ok(resource.visibility)
}

/// Determine which library bucket the viewer may read.
///
/// `graph` must contain the viewer's group closure and the owner's direct
/// membership edges.
pub fn resolve_target_library_access(
    resolver: &RoleResolver<'_>,
    ctx: &ViewerContext,
    graph: &RoleGraph,
    owner: &Resource,
) -> AuthzResult<LibraryAccess> {
    if owner.is_deleted() {
        return Err(AuthzError::NotFound(format!("library owner {} was deleted", owner.id)));
    }

    let access = library_access(resolver, ctx, graph, owner);
    debug!(
        viewer_id = ?ctx.user_id(),
        owner_id = %owner.id,
        access = ?access,
        "Resolved library access"
    );

    Ok(access)
}

fn library_access(
    resolver: &RoleResolver<'_>,
    ctx: &ViewerContext,
    graph: &RoleGraph,
    owner: &Resource,
) -> LibraryAccess {
    let registry = resolver.registry();

    if let Some(user) = ctx.user() {
        if resolver.has_administrative_standing(user, owner) {
            return LibraryAccess::Granted(Visibility::Private);
        }

        if direct_role(graph, &user.id, &owner.id).is_some() {
            return LibraryAccess::Granted(Visibility::Private);
        }
    }

    let implicit = resolver.resolve_implicit_role(ctx, graph, owner, &owner.role_priority());
    if implicit.has_role() {
        return if registry.is_logged_in(ctx, &owner.tenant_alias) {
            LibraryAccess::Granted(Visibility::LoggedIn)
        } else {
            LibraryAccess::Granted(Visibility::Public)
        };
    }

    if let Some(user) = ctx.user() {
        if owner.is_joinable() && registry.can_interact(&user.tenant_alias, &owner.tenant_alias) {
            return LibraryAccess::Granted(Visibility::Public);
        }
    }

    LibraryAccess::Denied
}
