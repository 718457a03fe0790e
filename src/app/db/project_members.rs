use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, ProjectId, Role, UserId};

use super::decode_role;

/// Project member joined with the user's attributes.
#[derive(Debug, Clone)]
pub struct ProjectMember {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
}

#[derive(FromRow)]
struct ProjectMemberRow {
    user_id: String,
    username: String,
    email: String,
    role: String,
    created_at: i64,
}

impl TryFrom<ProjectMemberRow> for ProjectMember {
    type Error = sqlx::Error;

    fn try_from(row: ProjectMemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: decode_role(&row.role)?,
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

/// A project membership whose user has no membership in the owning organization.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrphanedProjectMember {
    pub project_id: String,
    pub organization_id: String,
    pub user_id: String,
}

/// Find a member's role in a project. Returns None if not a member.
pub async fn find_role<'e, E>(
    executor: E,
    project_id: &ProjectId,
    user_id: &UserId,
) -> Result<Option<Role>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<String> =
        sqlx::query_scalar("SELECT role FROM project_members WHERE project_id = ? AND user_id = ?")
            .bind(project_id.as_str())
            .bind(user_id.as_str())
            .fetch_optional(executor)
            .await?;

    row.as_deref().map(decode_role).transpose()
}

/// List members of a project in insertion order.
pub async fn list<'e, E>(executor: E, project_id: &ProjectId) -> Result<Vec<ProjectMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProjectMemberRow>(
        "SELECT pm.user_id, u.username, u.email, pm.role, pm.created_at \
         FROM project_members pm \
         JOIN users u ON u.id = pm.user_id \
         WHERE pm.project_id = ? \
         ORDER BY pm.seq",
    )
    .bind(project_id.as_str())
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(ProjectMember::try_from).collect()
}

/// Create a project membership only if the user belongs to the project's organization.
///
/// The membership check and the insert are one statement, so a concurrent
/// organization removal cannot slip in between them. Returns false (nothing
/// written) if the project is missing or the user is not an organization member.
/// A duplicate (project, user) pair fails with a unique violation.
pub async fn insert_if_org_member<'e, E>(
    executor: E,
    project_id: &ProjectId,
    user_id: &UserId,
    role: Role,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "INSERT INTO project_members (project_id, user_id, role, created_at, seq) \
         SELECT p.id, om.user_id, ?, ?, \
                COALESCE((SELECT MAX(seq) FROM project_members WHERE project_id = p.id), 0) + 1 \
         FROM projects p \
         JOIN organization_members om ON om.organization_id = p.organization_id \
         WHERE p.id = ? AND om.user_id = ?",
    )
    .bind(role.to_string())
    .bind(now)
    .bind(project_id.as_str())
    .bind(user_id.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert or replace the role for (project, user).
/// Raw store write: does not check organization membership.
pub async fn upsert<'e, E>(
    executor: E,
    project_id: &ProjectId,
    user_id: &UserId,
    role: Role,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO project_members (project_id, user_id, role, created_at, seq) \
         VALUES (?1, ?2, ?3, ?4, \
                 COALESCE((SELECT MAX(seq) FROM project_members WHERE project_id = ?1), 0) + 1) \
         ON CONFLICT (project_id, user_id) DO UPDATE SET role = excluded.role",
    )
    .bind(project_id.as_str())
    .bind(user_id.as_str())
    .bind(role.to_string())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Replace the role of an existing project membership in place. Returns false if there is none.
pub async fn update_role<'e, E>(
    executor: E,
    project_id: &ProjectId,
    user_id: &UserId,
    role: Role,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE project_members SET role = ? WHERE project_id = ? AND user_id = ?")
        .bind(role.to_string())
        .bind(project_id.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete a project membership. Returns false if there was none.
pub async fn remove<'e, E>(executor: E, project_id: &ProjectId, user_id: &UserId) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND user_id = ?")
        .bind(project_id.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete every project membership the user holds in projects owned by the organization.
/// Returns the number of rows removed.
pub async fn remove_all_in_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "DELETE FROM project_members \
         WHERE user_id = ? \
           AND project_id IN (SELECT id FROM projects WHERE organization_id = ?)",
    )
    .bind(user_id.as_str())
    .bind(organization_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Project memberships that violate "project member implies organization member".
pub async fn find_orphans<'e, E>(executor: E) -> Result<Vec<OrphanedProjectMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, OrphanedProjectMember>(
        "SELECT pm.project_id, p.organization_id, pm.user_id \
         FROM project_members pm \
         JOIN projects p ON p.id = pm.project_id \
         LEFT JOIN organization_members om \
           ON om.organization_id = p.organization_id AND om.user_id = pm.user_id \
         WHERE om.user_id IS NULL \
         ORDER BY pm.project_id, pm.seq",
    )
    .fetch_all(executor)
    .await
}
