//! Resource domain models
//!
//! This module provides the Resource entity shared by every access-controlled
//! object on the platform: users, groups, content items, discussions and
//! folders. Users and groups are also principals that can hold roles.
//!
//! Resource ids are tenant-scoped and carry their kind:
//!
//! ```text
//! <prefix>:<tenantAlias>:<localId>
//!
//!   u:cam:mrvisser      user
//!   g:cam:oae-team      group
//!   c:gt:slides         content item
//!   d:gt:planning       discussion
//!   f:cam:reading-list  folder
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::{RolePriority, EDITOR, MANAGER, MEMBER, VIEWER};
use crate::visibility::Visibility;

/// Kind of an access-controlled resource.
///
/// The kind is the tag that selects role priority lists and capability rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A user account (principal)
    User,
    /// A group of users and groups (principal)
    Group,
    /// A content item (file, link, collaborative document)
    Content,
    /// A discussion thread
    Discussion,
    /// A folder of content items
    Folder,
}

impl ResourceKind {
    /// Every resource kind.
    pub fn all() -> [ResourceKind; 5] {
        [
            Self::User,
            Self::Group,
            Self::Content,
            Self::Discussion,
            Self::Folder,
        ]
    }

    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Content => "content",
            Self::Discussion => "discussion",
            Self::Folder => "folder",
        }
    }

    /// Parse kind from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "group" => Some(Self::Group),
            "content" => Some(Self::Content),
            "discussion" => Some(Self::Discussion),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }

    /// The single-letter prefix used in resource ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::User => "u",
            Self::Group => "g",
            Self::Content => "c",
            Self::Discussion => "d",
            Self::Folder => "f",
        }
    }

    /// Determine the kind of a resource from its id prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_org::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::from_id("g:cam:oae-team"), Some(ResourceKind::Group));
    /// assert_eq!(ResourceKind::from_id("nonsense"), None);
    /// ```
    pub fn from_id(id: &str) -> Option<Self> {
        ResourceId::parse(id).map(|parsed| parsed.kind)
    }

    /// Users and groups can hold roles; other kinds can only be targets.
    pub fn is_principal(&self) -> bool {
        matches!(self, Self::User | Self::Group)
    }

    /// The role priority list for this kind, lowest privilege first.
    ///
    /// Users carry no membership edges; their roles are only ever implicit
    /// (the user themself or a tenant administrator).
    pub fn role_priority(&self) -> RolePriority {
        match self {
            Self::Content => RolePriority::new([VIEWER, EDITOR, MANAGER]),
            Self::Discussion | Self::Group => RolePriority::new([MEMBER, MANAGER]),
            Self::Folder | Self::User => RolePriority::new([VIEWER, MANAGER]),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId<'a> {
    /// Kind encoded in the id prefix
    pub kind: ResourceKind,
    /// Alias of the tenant owning the resource
    pub tenant_alias: &'a str,
    /// Tenant-local identifier
    pub local_id: &'a str,
}

impl<'a> ResourceId<'a> {
    /// Parse a `<prefix>:<tenantAlias>:<localId>` id.
    ///
    /// Returns `None` for an unknown prefix or missing segments. The local id
    /// may itself contain colons.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_org::{ResourceId, ResourceKind};
    ///
    /// let id = ResourceId::parse("c:gt:slides:v2").unwrap();
    /// assert_eq!(id.kind, ResourceKind::Content);
    /// assert_eq!(id.tenant_alias, "gt");
    /// assert_eq!(id.local_id, "slides:v2");
    /// ```
    pub fn parse(id: &'a str) -> Option<Self> {
        let mut parts = id.splitn(3, ':');
        let kind = match parts.next()? {
            "u" => ResourceKind::User,
            "g" => ResourceKind::Group,
            "c" => ResourceKind::Content,
            "d" => ResourceKind::Discussion,
            "f" => ResourceKind::Folder,
            _ => return None,
        };
        let tenant_alias = parts.next().filter(|s| !s.is_empty())?;
        let local_id = parts.next().filter(|s| !s.is_empty())?;
        Some(Self {
            kind,
            tenant_alias,
            local_id,
        })
    }

    /// Build an id string from its parts.
    pub fn format(kind: ResourceKind, tenant_alias: &str, local_id: &str) -> String {
        format!("{}:{}:{}", kind.id_prefix(), tenant_alias, local_id)
    }
}

/// Whether principals may join a group without being added by a manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Joinable {
    /// Only managers can add members
    No,
    /// Anyone who can interact with the group may join
    Yes,
    /// Anyone who can interact with the group may request to join
    Request,
}

impl Default for Joinable {
    fn default() -> Self {
        Self::No
    }
}

/// An access-controlled resource.
///
/// # Examples
///
/// ```
/// use platform_org::{Joinable, Resource, ResourceKind, Visibility};
///
/// let group = Resource::group("cam", "oae-team", "OAE Team")
///     .with_visibility(Visibility::Private)
///     .with_joinable(Joinable::Request);
/// assert_eq!(group.id, "g:cam:oae-team");
/// assert_eq!(group.kind, ResourceKind::Group);
/// assert!(group.is_joinable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Globally unique id (`<prefix>:<tenantAlias>:<localId>`)
    pub id: String,

    /// Kind of resource
    pub kind: ResourceKind,

    /// Alias of the tenant the resource belongs to
    pub tenant_alias: String,

    /// Human-readable name
    pub display_name: String,

    /// Who can see the resource
    pub visibility: Visibility,

    /// Whether principals may join (groups only)
    #[serde(default)]
    pub joinable: Joinable,

    /// When the resource was soft-deleted, if it was
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A user or group: a resource that can hold roles.
pub type Principal = Resource;

impl Resource {
    /// Creates a new public, non-joinable resource.
    pub fn new(
        kind: ResourceKind,
        tenant_alias: impl Into<String>,
        local_id: &str,
        display_name: impl Into<String>,
    ) -> Self {
        let tenant_alias = tenant_alias.into();
        Self {
            id: ResourceId::format(kind, &tenant_alias, local_id),
            kind,
            tenant_alias,
            display_name: display_name.into(),
            visibility: Visibility::default(),
            joinable: Joinable::No,
            deleted_at: None,
        }
    }

    /// Creates a new user.
    pub fn user(
        tenant_alias: impl Into<String>,
        local_id: &str,
        display_name: impl Into<String>,
    ) -> Self {
        Self::new(ResourceKind::User, tenant_alias, local_id, display_name)
    }

    /// Creates a new group.
    pub fn group(
        tenant_alias: impl Into<String>,
        local_id: &str,
        display_name: impl Into<String>,
    ) -> Self {
        Self::new(ResourceKind::Group, tenant_alias, local_id, display_name)
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the joinability.
    pub fn with_joinable(mut self, joinable: Joinable) -> Self {
        self.joinable = joinable;
        self
    }

    /// Soft-delete the resource.
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
    }

    /// Check whether the resource has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check whether the resource can hold roles.
    pub fn is_principal(&self) -> bool {
        self.kind.is_principal()
    }

    /// Check whether principals may join (or request to join) the resource.
    ///
    /// Only groups honour the joinable flag.
    pub fn is_joinable(&self) -> bool {
        self.kind == ResourceKind::Group && self.joinable != Joinable::No
    }

    /// The role priority list for this resource's kind.
    pub fn role_priority(&self) -> RolePriority {
        self.kind.role_priority()
    }
}
