//! Viewer context for authorization decisions
//!
//! This module provides the ViewerContext type that describes who is asking:
//! the tenant the request arrived on and, if the request is authenticated,
//! the user making it.

use serde::{Deserialize, Serialize};

use crate::resource::{Principal, ResourceKind};

/// Who is performing a request, and on which tenant.
///
/// # Examples
///
/// ```
/// use platform_org::{Resource, ViewerContext};
///
/// let anonymous = ViewerContext::anonymous("cam");
/// assert!(anonymous.is_anonymous());
/// assert_eq!(anonymous.tenant_alias, "cam");
///
/// let user = Resource::user("gt", "nico", "Nicolaas");
/// let ctx = ViewerContext::authenticated(user);
/// assert_eq!(ctx.user_id(), Some("u:gt:nico"));
/// assert_eq!(ctx.tenant_alias, "gt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerContext {
    /// Alias of the tenant the request is served on
    pub tenant_alias: String,

    /// The authenticated user, if any
    pub user: Option<Principal>,
}

impl ViewerContext {
    /// Creates a context for an anonymous request on a tenant.
    pub fn anonymous(tenant_alias: impl Into<String>) -> Self {
        Self {
            tenant_alias: tenant_alias.into(),
            user: None,
        }
    }

    /// Creates a context for a user authenticated on their home tenant.
    pub fn authenticated(user: Principal) -> Self {
        Self {
            tenant_alias: user.tenant_alias.clone(),
            user: Some(user),
        }
    }

    /// Creates a context for a user browsing another tenant's host.
    pub fn authenticated_on(tenant_alias: impl Into<String>, user: Principal) -> Self {
        Self {
            tenant_alias: tenant_alias.into(),
            user: Some(user),
        }
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&Principal> {
        self.user.as_ref().filter(|u| u.kind == ResourceKind::User)
    }

    /// Id of the authenticated user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    /// Check if the request is anonymous.
    pub fn is_anonymous(&self) -> bool {
        self.user().is_none()
    }
}
