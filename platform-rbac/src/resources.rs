//! # Per-kind Capabilities
//!
//! Each resource kind decides view, manage and interact questions through a
//! `Capabilities` implementation. The defaults cover content, discussions and
//! folders; users and groups override the rules that differ for principals.
//!
//! | Kind       | View                          | Manage                     |
//! |------------|-------------------------------|----------------------------|
//! | content    | any role                      | `manager`                  |
//! | discussion | any role                      | `manager`                  |
//! | folder     | any role                      | `manager`                  |
//! | group      | any role, or can interact     | `manager`                  |
//! | user       | any role                      | self or tenant administrator |

use platform_org::{Principal, Resource, ResourceKind, RolePriority, ViewerContext};

use crate::actions::Capability;
use crate::error::{AuthzError, AuthzResult};
use crate::resolver::ImplicitRole;

/// Everything a capability decision needs, resolved up front.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// Who is asking
    pub ctx: &'a ViewerContext,
    /// What is asked about
    pub target: &'a Resource,
    /// The viewer's implicit role on the target
    pub implicit: &'a ImplicitRole,
    /// Whether the viewer is the target or administers its tenant
    pub administrative: bool,
}

impl<'a> AccessRequest<'a> {
    /// The authenticated viewer, if any.
    pub fn user(&self) -> Option<&'a Principal> {
        self.ctx.user()
    }

    /// Check whether the viewer is the target itself.
    pub fn is_self(&self) -> bool {
        self.ctx.user_id() == Some(self.target.id.as_str())
    }

    fn ensure_exists(&self) -> AuthzResult<()> {
        if self.target.is_deleted() {
            return Err(AuthzError::NotFound(format!("{} was deleted", self.target.id)));
        }
        Ok(())
    }

    fn ensure_authenticated(&self, capability: Capability) -> AuthzResult<&'a Principal> {
        self.user().ok_or_else(|| {
            AuthzError::Unauthenticated(format!(
                "anonymous users cannot {} {}",
                capability, self.target.id
            ))
        })
    }

    fn forbidden(&self, capability: Capability) -> AuthzError {
        let viewer = self.ctx.user_id().unwrap_or("anonymous");
        AuthzError::Forbidden(format!("{} cannot {} {}", viewer, capability, self.target.id))
    }
}

/// Capability rules of one resource kind.
pub trait Capabilities: Send + Sync {
    /// The kind these rules apply to.
    fn kind(&self) -> ResourceKind;

    /// Role priority list of the kind.
    fn role_priority(&self) -> RolePriority {
        self.kind().role_priority()
    }

    /// Check whether the viewer may read the target.
    fn can_view(&self, req: &AccessRequest<'_>) -> AuthzResult<()> {
        req.ensure_exists()?;
        if req.implicit.has_role() {
            return Ok(());
        }
        Err(req.forbidden(Capability::View))
    }

    /// Check whether the viewer may administer the target.
    fn can_manage(&self, req: &AccessRequest<'_>) -> AuthzResult<()> {
        req.ensure_exists()?;
        req.ensure_authenticated(Capability::Manage)?;

        let priority = self.role_priority();
        match req.implicit.role.as_deref() {
            Some(role) if priority.is_highest(role) => Ok(()),
            _ => Err(req.forbidden(Capability::Manage)),
        }
    }

    /// Check whether the viewer may act on the target.
    fn can_interact(&self, req: &AccessRequest<'_>) -> AuthzResult<()> {
        req.ensure_authenticated(Capability::Interact)?;
        if req.is_self() {
            return Err(AuthzError::InvalidArgument(format!(
                "{} cannot interact with itself",
                req.target.id
            )));
        }
        req.ensure_exists()?;

        if req.implicit.can_interact {
            return Ok(());
        }
        Err(req.forbidden(Capability::Interact))
    }

    /// Check a capability by name.
    fn check(&self, capability: Capability, req: &AccessRequest<'_>) -> AuthzResult<()> {
        match capability {
            Capability::View => self.can_view(req),
            Capability::Manage => self.can_manage(req),
            Capability::Interact => self.can_interact(req),
        }
    }
}

/// Rules for users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserCapabilities;

impl Capabilities for UserCapabilities {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn can_manage(&self, req: &AccessRequest<'_>) -> AuthzResult<()> {
        req.ensure_exists()?;
        req.ensure_authenticated(Capability::Manage)?;
        if req.administrative {
            return Ok(());
        }
        Err(req.forbidden(Capability::Manage))
    }
}

/// Rules for groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCapabilities;

impl Capabilities for GroupCapabilities {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Group
    }

    fn can_view(&self, req: &AccessRequest<'_>) -> AuthzResult<()> {
        req.ensure_exists()?;
        // Joinable groups are discoverable by everyone who could join them.
        if req.implicit.has_role() || req.implicit.can_interact {
            return Ok(());
        }
        Err(req.forbidden(Capability::View))
    }
}

/// Rules for content items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCapabilities;

impl Capabilities for ContentCapabilities {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Content
    }
}

/// Rules for discussions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscussionCapabilities;

impl Capabilities for DiscussionCapabilities {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Discussion
    }
}

/// Rules for folders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderCapabilities;

impl Capabilities for FolderCapabilities {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Folder
    }
}

/// Select the rules for a resource kind.
pub fn capabilities_for(kind: ResourceKind) -> &'static dyn Capabilities {
    match kind {
        ResourceKind::User => &UserCapabilities,
        ResourceKind::Group => &GroupCapabilities,
        ResourceKind::Content => &ContentCapabilities,
        ResourceKind::Discussion => &DiscussionCapabilities,
        ResourceKind::Folder => &FolderCapabilities,
    }
}
