//! Membership engine: role resolution and the membership writer.

pub mod audit;
pub mod error;
pub mod mutator;
pub mod resolver;

pub use error::MembershipError;
pub use mutator::{
    add_organization_member, add_organization_member_by_email, add_project_member,
    change_organization_role, change_project_role, remove_organization_member,
    remove_project_member,
};
pub use resolver::{
    resolve_organization_role, resolve_organization_roles_for_members, resolve_project_role,
    resolve_project_roles_for_members, MemberResolution,
};
