//! The only writer of membership rows.
//!
//! Each operation is a single statement or a single transaction. Uniqueness
//! is settled by the primary keys, so racing creators get exactly one success.

use sqlx::SqlitePool;

use crate::app::{
    db,
    domain::{Email, OrganizationId, ProjectId, Role, UserId},
};

use super::MembershipError;

fn duplicate_or(err: sqlx::Error) -> MembershipError {
    if db::is_unique_violation(&err) {
        MembershipError::DuplicateMembership
    } else {
        MembershipError::Database(err)
    }
}

/// Add a user to an organization.
pub async fn add_organization_member(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: Role,
) -> Result<(), MembershipError> {
    let inserted = db::organization_members::insert(pool, organization_id, user_id, role)
        .await
        .map_err(duplicate_or)
        .inspect_err(|err| tracing::warn!(%organization_id, %user_id, %err, "organization member not added"))?;

    if !inserted {
        if !db::organizations::exists(pool, organization_id).await? {
            return Err(MembershipError::OrganizationNotFound);
        }
        return Err(MembershipError::UserNotFound);
    }

    tracing::info!(%organization_id, %user_id, %role, "organization member added");
    Ok(())
}

/// Add an existing user, looked up by email, to an organization. Returns the user's id.
pub async fn add_organization_member_by_email(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
    email: &Email,
    role: Role,
) -> Result<UserId, MembershipError> {
    let user = db::users::find_by_email(pool, email)
        .await?
        .ok_or(MembershipError::UserNotFound)?;
    let user_id = UserId::from_string(&user.id)
        .map_err(|e| MembershipError::Database(sqlx::Error::Decode(Box::new(e))))?;

    add_organization_member(pool, organization_id, &user_id, role).await?;
    Ok(user_id)
}

/// Remove a user from an organization together with every project membership
/// they hold in that organization's projects. Both deletes commit or neither does.
pub async fn remove_organization_member(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<(), MembershipError> {
    let mut tx = pool.begin().await?;

    // Write first so the transaction holds the write lock before anything is read.
    if !db::organization_members::remove(&mut *tx, organization_id, user_id).await? {
        tracing::warn!(%organization_id, %user_id, "organization member not found for removal");
        return Err(MembershipError::MembershipNotFound);
    }
    let cascaded =
        db::project_members::remove_all_in_organization(&mut *tx, organization_id, user_id).await?;

    tx.commit().await?;

    tracing::info!(
        %organization_id,
        %user_id,
        project_memberships_removed = cascaded,
        "organization member removed"
    );
    Ok(())
}

/// Replace a user's organization role in place.
pub async fn change_organization_role(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: Role,
) -> Result<(), MembershipError> {
    if !db::organization_members::update_role(pool, organization_id, user_id, role).await? {
        if !db::organizations::exists(pool, organization_id).await? {
            return Err(MembershipError::OrganizationNotFound);
        }
        return Err(MembershipError::MembershipNotFound);
    }

    tracing::info!(%organization_id, %user_id, %role, "organization role changed");
    Ok(())
}

/// Grant a user a role in a project. The user must already belong to the project's organization.
pub async fn add_project_member(
    pool: &SqlitePool,
    project_id: &ProjectId,
    user_id: &UserId,
    role: Role,
) -> Result<(), MembershipError> {
    let inserted = db::project_members::insert_if_org_member(pool, project_id, user_id, role)
        .await
        .map_err(duplicate_or)
        .inspect_err(|err| tracing::warn!(%project_id, %user_id, %err, "project member not added"))?;

    if !inserted {
        if db::projects::find_by_id(pool, project_id).await?.is_none() {
            return Err(MembershipError::ProjectNotFound);
        }
        tracing::warn!(%project_id, %user_id, "project member refused: not an organization member");
        return Err(MembershipError::NotAnOrganizationMember);
    }

    tracing::info!(%project_id, %user_id, %role, "project member added");
    Ok(())
}

/// Replace a user's project role in place.
pub async fn change_project_role(
    pool: &SqlitePool,
    project_id: &ProjectId,
    user_id: &UserId,
    role: Role,
) -> Result<(), MembershipError> {
    if !db::project_members::update_role(pool, project_id, user_id, role).await? {
        if db::projects::find_by_id(pool, project_id).await?.is_none() {
            return Err(MembershipError::ProjectNotFound);
        }
        return Err(MembershipError::MembershipNotFound);
    }

    tracing::info!(%project_id, %user_id, %role, "project role changed");
    Ok(())
}

/// Remove a user's project membership. Organization membership is left untouched.
pub async fn remove_project_member(
    pool: &SqlitePool,
    project_id: &ProjectId,
    user_id: &UserId,
) -> Result<(), MembershipError> {
    if !db::project_members::remove(pool, project_id, user_id).await? {
        tracing::warn!(%project_id, %user_id, "project member not found for removal");
        return Err(MembershipError::MembershipNotFound);
    }

    tracing::info!(%project_id, %user_id, "project member removed");
    Ok(())
}
