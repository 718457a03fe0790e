use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Role held through a membership, at either organization or project scope.
///
/// Roles are compared by identity only. No ranking is defined here; a project
/// role shadows an organization role regardless of which one looks "higher".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Translator,
}

/// Scope level that produced an effective role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoleSource {
    Project,
    Organization,
    None,
}

/// Outcome of role resolution. The role and its provenance travel together,
/// so callers cannot pair a role from one read with a source from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRole {
    /// A project membership exists; it shadows any organization membership.
    Project(Role),
    /// No project membership, so the organization membership applies.
    Organization(Role),
    /// The user has no standing in the scope. Deny.
    NoAccess,
}

impl ResolvedRole {
    /// Effective role, or `None` when the user has no access.
    pub fn role(&self) -> Option<Role> {
        match self {
            ResolvedRole::Project(role) | ResolvedRole::Organization(role) => Some(*role),
            ResolvedRole::NoAccess => None,
        }
    }

    pub fn source(&self) -> RoleSource {
        match self {
            ResolvedRole::Project(_) => RoleSource::Project,
            ResolvedRole::Organization(_) => RoleSource::Organization,
            ResolvedRole::NoAccess => RoleSource::None,
        }
    }
}
