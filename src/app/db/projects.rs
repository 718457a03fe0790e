use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, ProjectId};

/// Database row for projects table.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub created_at: i64,
}

/// Data structure for inserting a new project.
pub struct NewProject {
    pub id: ProjectId,
    pub organization_id: OrganizationId,
    pub name: String,
}

/// Insert a new project.
pub async fn insert<'e, E>(executor: E, project: &NewProject) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO projects (id, organization_id, name, created_at) VALUES (?, ?, ?, ?)")
        .bind(project.id.as_str())
        .bind(project.organization_id.as_str())
        .bind(&project.name)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Find a project by ID.
pub async fn find_by_id<'e, E>(executor: E, project_id: &ProjectId) -> Result<Option<Project>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Project>(
        "SELECT id, organization_id, name, created_at FROM projects WHERE id = ?",
    )
    .bind(project_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Find all projects owned by an organization, oldest first.
pub async fn list_by_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<Project>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Project>(
        "SELECT id, organization_id, name, created_at FROM projects WHERE organization_id = ? ORDER BY created_at, id",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await
}
