//! Effective-role resolution over the membership store.
//!
//! Every public function reads inside one transaction, so the project and
//! organization lookups that make up a resolution come from the same snapshot.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::app::{
    db,
    domain::{OrganizationId, ProjectId, ResolvedRole, Role, UserId},
};

use super::MembershipError;

/// A member of a project's organization together with their resolved project role.
#[derive(Debug, Clone)]
pub struct MemberResolution {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub resolved: ResolvedRole,
}

/// Apply project-over-organization precedence to the two lookups.
///
/// A project role without an organization role breaks the membership invariant;
/// it is returned as `Err` so the caller can report it, and must be treated as absent.
fn precedence(
    project_role: Option<Role>,
    organization_role: Option<Role>,
) -> Result<ResolvedRole, ResolvedRole> {
    match (project_role, organization_role) {
        (Some(role), Some(_)) => Ok(ResolvedRole::Project(role)),
        (Some(_), None) => Err(ResolvedRole::NoAccess),
        (None, Some(role)) => Ok(ResolvedRole::Organization(role)),
        (None, None) => Ok(ResolvedRole::NoAccess),
    }
}

fn report_orphan(project_id: &str, user_id: &str) {
    let err = MembershipError::InconsistentState {
        project_id: project_id.to_string(),
        user_id: user_id.to_string(),
    };
    tracing::error!(%err, "ignoring project membership without organization membership");
}

fn fail_closed(outcome: Result<ResolvedRole, ResolvedRole>, project_id: &str, user_id: &str) -> ResolvedRole {
    outcome.unwrap_or_else(|fallback| {
        report_orphan(project_id, user_id);
        fallback
    })
}

fn organization_of(project: &db::Project) -> Result<OrganizationId, MembershipError> {
    OrganizationId::from_string(&project.organization_id)
        .map_err(|e| MembershipError::Database(sqlx::Error::Decode(Box::new(e))))
}

/// Resolve within an already-open connection or transaction.
pub async fn resolve_project_role_in(
    conn: &mut SqliteConnection,
    project_id: &ProjectId,
    user_id: &UserId,
) -> Result<ResolvedRole, MembershipError> {
    let project = db::projects::find_by_id(&mut *conn, project_id)
        .await?
        .ok_or(MembershipError::ProjectNotFound)?;
    let organization_id = organization_of(&project)?;

    let project_role = db::project_members::find_role(&mut *conn, project_id, user_id).await?;
    let organization_role =
        db::organization_members::find_role(&mut *conn, &organization_id, user_id).await?;

    Ok(fail_closed(
        precedence(project_role, organization_role),
        &project.id,
        &user_id.as_str(),
    ))
}

/// Effective role of a user in a project, with its source.
///
/// A project membership shadows any organization membership. Without either,
/// the result is `NoAccess`; no default role is ever substituted.
pub async fn resolve_project_role(
    pool: &SqlitePool,
    project_id: &ProjectId,
    user_id: &UserId,
) -> Result<ResolvedRole, MembershipError> {
    let mut tx = pool.begin().await?;
    let resolved = resolve_project_role_in(&mut tx, project_id, user_id).await?;
    tx.commit().await?;
    Ok(resolved)
}

/// Role of a user at organization scope. There is nothing above the organization to fall back to.
pub async fn resolve_organization_role(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<ResolvedRole, MembershipError> {
    let mut tx = pool.begin().await?;
    if !db::organizations::exists(&mut *tx, organization_id).await? {
        return Err(MembershipError::OrganizationNotFound);
    }
    let role = db::organization_members::find_role(&mut *tx, organization_id, user_id).await?;
    tx.commit().await?;

    Ok(role.map_or(ResolvedRole::NoAccess, ResolvedRole::Organization))
}

/// Resolve the project role of every member of the project's organization, in
/// organization insertion order, from a single snapshot.
pub async fn resolve_project_roles_for_members(
    pool: &SqlitePool,
    project_id: &ProjectId,
) -> Result<Vec<MemberResolution>, MembershipError> {
    let mut tx = pool.begin().await?;

    let project = db::projects::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(MembershipError::ProjectNotFound)?;
    let organization_id = organization_of(&project)?;

    let organization_members = db::organization_members::list(&mut *tx, &organization_id).await?;
    let project_members = db::project_members::list(&mut *tx, project_id).await?;
    tx.commit().await?;

    let mut project_roles: HashMap<String, Role> = project_members
        .into_iter()
        .map(|m| (m.user_id, m.role))
        .collect();

    let resolutions = organization_members
        .into_iter()
        .map(|member| {
            let project_role = project_roles.remove(&member.user_id);
            let resolved = fail_closed(
                precedence(project_role, Some(member.role)),
                &project.id,
                &member.user_id,
            );
            MemberResolution {
                user_id: member.user_id,
                username: member.username,
                email: member.email,
                resolved,
            }
        })
        .collect();

    // Anything left is a project membership with no organization membership behind it.
    for user_id in project_roles.keys() {
        report_orphan(&project.id, user_id);
    }

    Ok(resolutions)
}

/// Organization-scope resolution for every member of an organization, in insertion order.
pub async fn resolve_organization_roles_for_members(
    pool: &SqlitePool,
    organization_id: &OrganizationId,
) -> Result<Vec<MemberResolution>, MembershipError> {
    let mut tx = pool.begin().await?;
    if !db::organizations::exists(&mut *tx, organization_id).await? {
        return Err(MembershipError::OrganizationNotFound);
    }
    let members = db::organization_members::list(&mut *tx, organization_id).await?;
    tx.commit().await?;

    Ok(members
        .into_iter()
        .map(|member| MemberResolution {
            user_id: member.user_id,
            username: member.username,
            email: member.email,
            resolved: ResolvedRole::Organization(member.role),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_role_shadows_organization_role() {
        assert_eq!(
            precedence(Some(Role::Translator), Some(Role::Owner)),
            Ok(ResolvedRole::Project(Role::Translator))
        );
    }

    #[test]
    fn organization_role_is_the_fallback() {
        assert_eq!(
            precedence(None, Some(Role::Admin)),
            Ok(ResolvedRole::Organization(Role::Admin))
        );
    }

    #[test]
    fn neither_membership_means_no_access() {
        assert_eq!(precedence(None, None), Ok(ResolvedRole::NoAccess));
    }

    #[test]
    fn orphaned_project_role_fails_closed() {
        let outcome = precedence(Some(Role::Admin), None);
        assert_eq!(outcome, Err(ResolvedRole::NoAccess));
        assert_eq!(fail_closed(outcome, "p", "u"), ResolvedRole::NoAccess);
    }
}
