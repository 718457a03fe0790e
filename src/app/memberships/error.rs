use thiserror::Error;

/// Failure kinds of the membership engine. Transport mapping lives in `AppError`.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// The membership being created already exists.
    #[error("membership already exists")]
    DuplicateMembership,

    /// The membership being removed or changed does not exist.
    #[error("membership not found")]
    MembershipNotFound,

    /// A project role was requested for a user outside the project's organization.
    #[error("user is not a member of the project's organization")]
    NotAnOrganizationMember,

    /// A project membership exists without the organization membership it depends on.
    #[error("project membership for user {user_id} in project {project_id} has no organization membership")]
    InconsistentState { project_id: String, user_id: String },

    #[error("organization not found")]
    OrganizationNotFound,

    #[error("project not found")]
    ProjectNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
