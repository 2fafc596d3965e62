//! Membership records
//!
//! A membership is a directed edge `principal → resource` carrying a role.
//! These records are what the external membership store hands back; the
//! authorization engine assembles them into a graph per resolution.

use serde::{Deserialize, Serialize};

/// A principal's role on a resource, as listed from the resource side.
///
/// # Examples
///
/// ```
/// use platform_org::MemberRole;
///
/// let member = MemberRole::new("u:cam:mrvisser", "manager");
/// assert_eq!(member.role, "manager");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRole {
    /// User or group holding the role
    pub principal_id: String,

    /// Role label
    pub role: String,
}

impl MemberRole {
    /// Creates a new member role record.
    pub fn new(principal_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            role: role.into(),
        }
    }
}

/// A role held directly by a principal, as listed from the principal side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectRole {
    /// Resource the role is held on
    pub resource_id: String,

    /// Role label
    pub role: String,
}

impl DirectRole {
    /// Creates a new direct role record.
    pub fn new(resource_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            role: role.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_creation() {
        let member = MemberRole::new("g:cam:team", "member");
        assert_eq!(member.principal_id, "g:cam:team");
        assert_eq!(member.role, "member");
    }

    #[test]
    fn test_direct_role_serialization() {
        let direct = DirectRole::new("c:cam:doc", "viewer");
        let json = serde_json::to_value(&direct).unwrap();
        assert_eq!(json["resource_id"], "c:cam:doc");
        assert_eq!(json["role"], "viewer");
    }
}
