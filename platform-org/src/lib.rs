//! # Platform Organization Model
//!
//! This crate provides the multi-tenant data model consumed by the Relay
//! platform's authorization engine (`platform-rbac`).
//!
//! ## Overview
//!
//! The platform-org crate handles:
//! - **Tenants**: Top-level tenant entities with privacy and permeability
//! - **Resources**: Users, groups, content, discussions and folders
//! - **Visibility**: The `private` < `loggedin` < `public` levels
//! - **Roles**: Per-kind role priority lists
//! - **Memberships**: Role-carrying edges between principals and resources
//! - **Invitations**: Email-keyed pending grants
//! - **Context**: Who is asking, on which tenant
//!
//! ## Architecture
//!
//! ```text
//! Tenant
//!   └─ Resource (user | group | content | discussion | folder)
//!        ├─ Visibility
//!        ├─ Joinable (groups)
//!        ├─ MemberRole ←─ principal (user | group)
//!        └─ Invitation ←─ email
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use platform_org::{Joinable, Resource, Tenant, ViewerContext, Visibility};
//!
//! let cam = Tenant::new("cam", "Cambridge", "cam.oae.com");
//!
//! let group = Resource::group(&cam.alias, "oae-team", "OAE Team")
//!     .with_visibility(Visibility::LoggedIn)
//!     .with_joinable(Joinable::Request);
//!
//! let user = Resource::user(&cam.alias, "mrvisser", "Branden");
//! let ctx = ViewerContext::authenticated(user);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod context;
pub mod invitation;
pub mod membership;
pub mod resource;
pub mod roles;
pub mod tenant;
pub mod visibility;

// Re-export main types for convenience
pub use context::ViewerContext;
pub use invitation::Invitation;
pub use membership::{DirectRole, MemberRole};
pub use resource::{Joinable, Principal, Resource, ResourceId, ResourceKind};
pub use roles::RolePriority;
pub use tenant::Tenant;
pub use visibility::Visibility;
