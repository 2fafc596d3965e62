//! # Platform RBAC (Role Resolution and Visibility)
//!
//! This crate decides, for any principal and resource, which role the
//! principal effectively holds, whether an operation is permitted, and which
//! library visibility bucket a viewer may read.
//!
//! ## Overview
//!
//! The platform-rbac crate handles:
//! - **Membership Graph**: per-resolution directed graph of memberships,
//!   safe on cyclic group chains
//! - **Role Resolution**: direct, transitive and implicit roles, highest wins
//! - **Capabilities**: view, manage and interact checks per resource kind
//! - **Library Visibility**: bucket assignment and bucket access
//! - **Invitation Diffs**: added, promoted, demoted and removed pending grants
//!
//! ## Architecture
//!
//! ```text
//!   MembershipStore ──► MembershipLoader ──► RoleGraph
//!   (async, paged)      (session cache)         │
//!                                               ▼
//!   TenantRegistry ──────────────────────► RoleResolver
//!                                               │
//!                     ┌─────────────────────────┼──────────────────────┐
//!                     ▼                         ▼                      ▼
//!             PermissionChecker        Library visibility      Invitation diffs
//! ```
//!
//! Store I/O happens only in the loader. Everything downstream of the graph
//! is pure and synchronous.
//!
//! ## Roles
//!
//! Each resource kind has a fixed role priority list:
//!
//! | Kind       | Roles (lowest to highest)      |
//! |------------|--------------------------------|
//! | content    | `viewer` < `editor` < `manager` |
//! | discussion | `member` < `manager`           |
//! | folder     | `viewer` < `manager`           |
//! | group      | `member` < `manager`           |
//! | user       | `viewer` < `manager`           |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use platform_org::{Resource, ResourceKind, Tenant, ViewerContext, Visibility};
//! use platform_rbac::{AuthzService, EngineConfig, MemoryMembershipStore, TenantDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut directory = TenantDirectory::new();
//! directory.add_tenant(Tenant::new("cam", "Cambridge", "cam.oae.com"));
//!
//! let store = MemoryMembershipStore::new();
//! store.grant("g:cam:team", "u:cam:nico", "member").await;
//! store.grant("c:cam:doc", "g:cam:team", "manager").await;
//!
//! let service = AuthzService::in_memory(store, Arc::new(directory), EngineConfig::from_env())?;
//! let mut session = service.session();
//!
//! let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));
//! let doc = Resource::new(ResourceKind::Content, "cam", "doc", "Doc")
//!     .with_visibility(Visibility::Private);
//!
//! session.can_manage(&ctx, &doc).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every check returns `AuthzResult`. Denials (`Unauthenticated`, `NotFound`,
//! `InvalidArgument`, `Forbidden`) are deterministic outcomes of the inputs;
//! `UpstreamFailure` carries store errors through unchanged.

pub mod actions;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod invitations;
pub mod library;
pub mod loader;
pub mod memory;
pub mod permissions;
pub mod registry;
pub mod resolver;
pub mod resources;
pub mod session;
pub mod store;

pub use actions::Capability;
pub use cache::ResolutionCache;
pub use config::{ConfigError, EngineConfig};
pub use error::{AuthzError, AuthzResult};
pub use graph::{Edge, MembershipGraph, Node};
pub use invitations::{
    compute_role_changes, ChangeKind, DiffOptions, InvitationChange, InvitationDiff, RoleChange,
};
pub use library::{resolve_library_bucket_visibility, resolve_target_library_access, LibraryAccess};
pub use memory::MemoryMembershipStore;
pub use permissions::{InteractionReport, PermissionChecker};
pub use registry::{TenantDirectory, TenantRegistry};
pub use resolver::{
    direct_role, resolve_effective_role, ImplicitRole, MemberNode, MembershipAttrs, RoleGraph,
    RoleResolver,
};
pub use resources::{capabilities_for, AccessRequest, Capabilities};
pub use session::{AuthzService, AuthzSession};
pub use store::{InvitationStore, MembershipStore, Page, PageRequest};
