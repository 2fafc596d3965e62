//! Tenant domain models
//!
//! This module provides the Tenant entity for multi-tenant deployments. Every
//! principal and resource belongs to exactly one tenant, identified by its
//! alias. Tenants decide whether principals from other tenants may interact
//! with their resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant of the platform.
///
/// # Interaction Rules
///
/// - Principals always interact freely within their own tenant
/// - A private tenant is sealed: nobody crosses its boundary in either direction
/// - A public tenant admits principals from other public tenants only when it
///   is permeable
///
/// # Examples
///
/// ```
/// use platform_org::Tenant;
///
/// let cam = Tenant::new("cam", "Cambridge", "cam.oae.com");
/// let gt = Tenant::new("gt", "Georgia Tech", "gt.oae.com");
/// assert!(gt.can_interact_with(&cam));
///
/// let sealed = Tenant::new("sealed", "Sealed", "sealed.oae.com").with_private(true);
/// assert!(!gt.can_interact_with(&sealed));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique alias (appears in every resource id of the tenant)
    pub alias: String,

    /// Human-readable name
    pub display_name: String,

    /// Host name the tenant is served on
    pub host: String,

    /// Whether the tenant is private (sealed off from other tenants)
    pub is_private: bool,

    /// Whether principals of other public tenants may interact with this
    /// tenant's resources
    pub is_permeable: bool,

    /// Whether the tenant is active
    pub is_active: bool,

    /// When the tenant was created
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Creates a new public, permeable, active tenant.
    pub fn new(
        alias: impl Into<String>,
        display_name: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            display_name: display_name.into(),
            host: host.into(),
            is_private: false,
            is_permeable: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Set whether the tenant is private.
    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Set whether the tenant is permeable.
    pub fn with_permeable(mut self, is_permeable: bool) -> Self {
        self.is_permeable = is_permeable;
        self
    }

    /// Check if the tenant is public.
    pub fn is_public(&self) -> bool {
        !self.is_private
    }

    /// Check whether principals of this tenant may interact with resources
    /// owned by `owner`.
    pub fn can_interact_with(&self, owner: &Tenant) -> bool {
        if self.alias == owner.alias {
            return true;
        }

        self.is_public() && owner.is_public() && owner.is_permeable
    }
}
