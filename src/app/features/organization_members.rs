//! /api/organizations/:organization_id/members: Organization membership management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db,
    domain::{Email, OrganizationId, Role, UserId},
    error::AppError,
    features::serialization::{MembersResponse, OrganizationMemberDocument},
    memberships, tenant, AppState,
};

/// Role given to members added without an explicit one.
const DEFAULT_MEMBER_ROLE: Role = Role::Translator;

/// Request body for adding an existing user to an organization.
#[derive(Debug, Deserialize)]
pub struct AddOrganizationMemberRequest {
    pub email: String,
    pub role: Option<Role>,
}

/// Request body for changing a member's role.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

async fn member_document(
    state: &AppState,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<OrganizationMemberDocument, AppError> {
    let user = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    let resolved = memberships::resolve_organization_role(&state.db, organization_id, user_id).await?;
    Ok(OrganizationMemberDocument::new(user, resolved))
}

/// GET /api/organizations/:organization_id/members: Members in insertion order.
pub async fn list_members(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> Result<Json<MembersResponse<OrganizationMemberDocument>>, AppError> {
    let organization_id = tenant::organization_id(&organization_id)?;

    let members = memberships::resolve_organization_roles_for_members(&state.db, &organization_id)
        .await?
        .into_iter()
        .map(OrganizationMemberDocument::from)
        .collect();

    Ok(Json(MembersResponse { members }))
}

/// POST /api/organizations/:organization_id/members: Add an existing user by email.
pub async fn add_member(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
    Json(request): Json<AddOrganizationMemberRequest>,
) -> Result<(StatusCode, Json<OrganizationMemberDocument>), AppError> {
    let organization_id = tenant::organization_id(&organization_id)?;
    let email = Email::new(&request.email)
        .map_err(|_| AppError::Validation("Invalid email".to_string()))?;
    let role = request.role.unwrap_or(DEFAULT_MEMBER_ROLE);

    let user_id =
        memberships::add_organization_member_by_email(&state.db, &organization_id, &email, role).await?;

    let doc = member_document(&state, &organization_id, &user_id).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// PATCH /api/organizations/:organization_id/members/:user_id: Change a member's role.
pub async fn change_role(
    State(state): State<AppState>,
    Path((organization_id, user_id)): Path<(String, String)>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<OrganizationMemberDocument>, AppError> {
    let organization_id = tenant::organization_id(&organization_id)?;
    let user_id = tenant::user_id(&user_id)?;

    memberships::change_organization_role(&state.db, &organization_id, &user_id, request.role).await?;

    let doc = member_document(&state, &organization_id, &user_id).await?;
    Ok(Json(doc))
}

/// DELETE /api/organizations/:organization_id/members/:user_id: Remove a member and their project memberships.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((organization_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let organization_id = tenant::organization_id(&organization_id)?;
    let user_id = tenant::user_id(&user_id)?;

    memberships::remove_organization_member(&state.db, &organization_id, &user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Organization membership routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/organizations/:organization_id/members",
            get(list_members).post(add_member),
        )
        .route(
            "/api/organizations/:organization_id/members/:user_id",
            patch(change_role).delete(remove_member),
        )
}
