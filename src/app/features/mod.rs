pub mod organization_members;
pub mod project_members;
pub mod serialization;

use axum::Router;

use crate::app::AppState;

/// Membership management API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(organization_members::routes())
        .merge(project_members::routes())
}
