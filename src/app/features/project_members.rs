//! /api/projects/:project_id/members: Project membership management and effective roles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db,
    domain::{ProjectId, Role, UserId},
    error::AppError,
    features::serialization::{MembersResponse, ProjectMemberDocument},
    memberships, tenant, AppState,
};

/// Request body for granting a project role.
#[derive(Debug, Deserialize)]
pub struct AddProjectMemberRequest {
    pub user_id: String,
    pub role: Role,
}

/// Request body for changing a project role.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

async fn member_document(
    state: &AppState,
    project_id: &ProjectId,
    user_id: &UserId,
) -> Result<ProjectMemberDocument, AppError> {
    let user = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    let resolved = memberships::resolve_project_role(&state.db, project_id, user_id).await?;
    Ok(ProjectMemberDocument::new(user, resolved))
}

/// GET /api/projects/:project_id/members: Every organization member with their effective project role.
pub async fn list_members(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<MembersResponse<ProjectMemberDocument>>, AppError> {
    let project_id = tenant::project_id(&project_id)?;

    let members = memberships::resolve_project_roles_for_members(&state.db, &project_id)
        .await?
        .into_iter()
        .map(ProjectMemberDocument::from)
        .collect();

    Ok(Json(MembersResponse { members }))
}

/// GET /api/projects/:project_id/members/:user_id: Effective role and its source for one user.
pub async fn show_member(
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> Result<Json<ProjectMemberDocument>, AppError> {
    let project_id = tenant::project_id(&project_id)?;
    let user_id = tenant::user_id(&user_id)?;

    Ok(Json(member_document(&state, &project_id, &user_id).await?))
}

/// POST /api/projects/:project_id/members: Grant a project role to an organization member.
pub async fn add_member(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<AddProjectMemberRequest>,
) -> Result<(StatusCode, Json<ProjectMemberDocument>), AppError> {
    let project_id = tenant::project_id(&project_id)?;
    let user_id = UserId::from_string(&request.user_id)
        .map_err(|_| AppError::Validation("Invalid user_id".to_string()))?;

    memberships::add_project_member(&state.db, &project_id, &user_id, request.role).await?;

    let doc = member_document(&state, &project_id, &user_id).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// PATCH /api/projects/:project_id/members/:user_id: Change a project role.
pub async fn change_role(
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(String, String)>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<ProjectMemberDocument>, AppError> {
    let project_id = tenant::project_id(&project_id)?;
    let user_id = tenant::user_id(&user_id)?;

    memberships::change_project_role(&state.db, &project_id, &user_id, request.role).await?;

    Ok(Json(member_document(&state, &project_id, &user_id).await?))
}

/// DELETE /api/projects/:project_id/members/:user_id: Remove a project membership.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let project_id = tenant::project_id(&project_id)?;
    let user_id = tenant::user_id(&user_id)?;

    memberships::remove_project_member(&state.db, &project_id, &user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Project membership routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/:project_id/members",
            get(list_members).post(add_member),
        )
        .route(
            "/api/projects/:project_id/members/:user_id",
            get(show_member).patch(change_role).delete(remove_member),
        )
}
