//! Member documents rendered from resolver output.
//!
//! Project context carries `role` and `role_source`; organization context
//! carries `role_organization`. Nothing here reads the store.

use serde::Serialize;

use crate::app::{
    db::User,
    domain::{ResolvedRole, Role, RoleSource},
    memberships::MemberResolution,
};

/// User document in a project context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectMemberDocument {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Option<Role>,
    pub role_source: RoleSource,
}

/// User document in an organization context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationMemberDocument {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role_organization: Option<Role>,
}

/// Response for member listings.
#[derive(Debug, Serialize)]
pub struct MembersResponse<T> {
    pub members: Vec<T>,
}

impl ProjectMemberDocument {
    pub fn new(user: User, resolved: ResolvedRole) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: resolved.role(),
            role_source: resolved.source(),
        }
    }
}

impl From<MemberResolution> for ProjectMemberDocument {
    fn from(m: MemberResolution) -> Self {
        Self {
            id: m.user_id,
            username: m.username,
            email: m.email,
            role: m.resolved.role(),
            role_source: m.resolved.source(),
        }
    }
}

impl OrganizationMemberDocument {
    pub fn new(user: User, resolved: ResolvedRole) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role_organization: resolved.role(),
        }
    }
}

impl From<MemberResolution> for OrganizationMemberDocument {
    fn from(m: MemberResolution) -> Self {
        Self {
            id: m.user_id,
            username: m.username,
            email: m.email,
            role_organization: m.resolved.role(),
        }
    }
}
