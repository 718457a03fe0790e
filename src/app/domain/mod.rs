pub mod email;
pub mod ids;
pub mod role;
pub mod username;

pub use email::Email;
pub use ids::{OrganizationId, ProjectId, UserId};
pub use role::{ResolvedRole, Role, RoleSource};
pub use username::Username;
