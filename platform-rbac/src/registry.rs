//! Tenant registry
//!
//! The engine asks the tenant registry three questions: is the viewer logged
//! in to a tenant, may principals of one tenant interact with another, and is
//! a principal an administrator of a tenant. `TenantDirectory` answers them
//! from an explicitly constructed, explicitly passed set of tenants.

use std::collections::{HashMap, HashSet};

use platform_org::{Principal, Tenant, ViewerContext};

/// Tenant-level facts consumed by the engine.
pub trait TenantRegistry: Send + Sync {
    /// Check whether the viewer is authenticated to the given tenant.
    fn is_logged_in(&self, ctx: &ViewerContext, tenant_alias: &str) -> bool;

    /// Check whether principals of `viewer_tenant` may interact with resources
    /// of `owner_tenant`.
    fn can_interact(&self, viewer_tenant: &str, owner_tenant: &str) -> bool;

    /// Check whether a principal administers a tenant.
    fn is_administrator_of(&self, principal: &Principal, tenant_alias: &str) -> bool;
}

/// In-memory tenant registry.
///
/// Unknown tenants are treated as private: nobody interacts across a boundary
/// the directory knows nothing about.
///
/// # Example
///
/// ```
/// use platform_org::{Resource, Tenant};
/// use platform_rbac::registry::{TenantDirectory, TenantRegistry};
///
/// let mut directory = TenantDirectory::new();
/// directory.add_tenant(Tenant::new("cam", "Cambridge", "cam.oae.com"));
/// directory.add_tenant(Tenant::new("gt", "Georgia Tech", "gt.oae.com"));
///
/// let admin = Resource::user("cam", "admin", "Admin");
/// directory.add_administrator("cam", &admin.id);
///
/// assert!(directory.can_interact("gt", "cam"));
/// assert!(directory.is_administrator_of(&admin, "cam"));
/// assert!(!directory.is_administrator_of(&admin, "gt"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TenantDirectory {
    tenants: HashMap<String, Tenant>,
    /// Tenant alias → ids of its administrators
    administrators: HashMap<String, HashSet<String>>,
    /// Administrators of every tenant
    global_administrators: HashSet<String>,
}

impl TenantDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a tenant.
    pub fn add_tenant(&mut self, tenant: Tenant) {
        self.tenants.insert(tenant.alias.clone(), tenant);
    }

    /// Look up a tenant by alias.
    pub fn tenant(&self, alias: &str) -> Option<&Tenant> {
        self.tenants.get(alias)
    }

    /// Make a principal an administrator of one tenant.
    pub fn add_administrator(&mut self, tenant_alias: &str, principal_id: &str) {
        self.administrators
            .entry(tenant_alias.to_string())
            .or_default()
            .insert(principal_id.to_string());
    }

    /// Make a principal an administrator of every tenant.
    pub fn add_global_administrator(&mut self, principal_id: &str) {
        self.global_administrators.insert(principal_id.to_string());
    }

    /// Revoke a principal's administration of a tenant.
    pub fn remove_administrator(&mut self, tenant_alias: &str, principal_id: &str) {
        if let Some(admins) = self.administrators.get_mut(tenant_alias) {
            admins.remove(principal_id);
        }
    }
}

impl TenantRegistry for TenantDirectory {
    fn is_logged_in(&self, ctx: &ViewerContext, tenant_alias: &str) -> bool {
        ctx.user()
            .map(|user| user.tenant_alias == tenant_alias)
            .unwrap_or(false)
    }

    fn can_interact(&self, viewer_tenant: &str, owner_tenant: &str) -> bool {
        if viewer_tenant == owner_tenant {
            return true;
        }

        match (self.tenants.get(viewer_tenant), self.tenants.get(owner_tenant)) {
            (Some(viewer), Some(owner)) => viewer.can_interact_with(owner),
            _ => false,
        }
    }

    fn is_administrator_of(&self, principal: &Principal, tenant_alias: &str) -> bool {
        if self.global_administrators.contains(&principal.id) {
            return true;
        }

        self.administrators
            .get(tenant_alias)
            .map(|admins| admins.contains(&principal.id))
            .unwrap_or(false)
    }
}
