use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, Role, UserId};

use super::decode_role;

/// Organization member joined with the user's attributes.
#[derive(Debug, Clone)]
pub struct OrganizationMember {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
}

#[derive(FromRow)]
struct OrganizationMemberRow {
    user_id: String,
    username: String,
    email: String,
    role: String,
    created_at: i64,
}

impl TryFrom<OrganizationMemberRow> for OrganizationMember {
    type Error = sqlx::Error;

    fn try_from(row: OrganizationMemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: decode_role(&row.role)?,
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

/// Find a member's role in an organization. Returns None if not a member.
pub async fn find_role<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<Option<Role>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<String> = sqlx::query_scalar(
        "SELECT role FROM organization_members WHERE organization_id = ? AND user_id = ?",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .fetch_optional(executor)
    .await?;

    row.as_deref().map(decode_role).transpose()
}

/// List members of an organization in insertion order.
pub async fn list<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Vec<OrganizationMember>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, OrganizationMemberRow>(
        "SELECT om.user_id, u.username, u.email, om.role, om.created_at \
         FROM organization_members om \
         JOIN users u ON u.id = om.user_id \
         WHERE om.organization_id = ? \
         ORDER BY om.seq",
    )
    .bind(organization_id.as_str())
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(OrganizationMember::try_from).collect()
}

/// Create a membership when both the organization and the user exist.
///
/// Returns false (nothing written) if either is missing. A duplicate
/// (organization, user) pair fails with a unique violation from the primary key.
pub async fn insert<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: Role,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "INSERT INTO organization_members (organization_id, user_id, role, created_at, seq) \
         SELECT o.id, u.id, ?, ?, \
                COALESCE((SELECT MAX(seq) FROM organization_members WHERE organization_id = o.id), 0) + 1 \
         FROM organizations o, users u \
         WHERE o.id = ? AND u.id = ?",
    )
    .bind(role.to_string())
    .bind(now)
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert or replace the role for (organization, user). Keeps the original insertion position.
/// Raw store write: performs no invariant checks.
pub async fn upsert<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: Role,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organization_members (organization_id, user_id, role, created_at, seq) \
         VALUES (?1, ?2, ?3, ?4, \
                 COALESCE((SELECT MAX(seq) FROM organization_members WHERE organization_id = ?1), 0) + 1) \
         ON CONFLICT (organization_id, user_id) DO UPDATE SET role = excluded.role",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .bind(role.to_string())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Replace the role of an existing membership in place. Returns false if there is no membership.
pub async fn update_role<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: Role,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE organization_members SET role = ? WHERE organization_id = ? AND user_id = ?",
    )
    .bind(role.to_string())
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete a membership. Returns false if there was none.
/// Raw store write: does not touch project memberships.
pub async fn remove<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM organization_members WHERE organization_id = ? AND user_id = ?")
        .bind(organization_id.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
