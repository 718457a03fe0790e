#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use transloom::app::{
    config::Config,
    db,
    domain::{Email, OrganizationId, ProjectId, UserId, Username},
    AppState,
};
use transloom::create_router;

/// In-memory database with migrations applied. Shared by every connection in the pool.
pub async fn test_pool() -> SqlitePool {
    let pool = db::connect(&Config::for_tests()).await.unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

/// Scratch directory holding a file-backed test database. Removed with its contents on drop.
pub struct TempDb {
    dir: PathBuf,
}

impl TempDb {
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// File-backed WAL database in its own temp directory, for tests that race real connections.
/// Keep the returned `TempDb` alive for as long as the pool is used.
pub async fn file_pool() -> (SqlitePool, TempDb) {
    let dir = std::env::temp_dir().join(format!("transloom-test-{}", ulid::Ulid::new()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = Config {
        database_url: format!("sqlite://{}", dir.join("transloom.db").display()),
        db_max_connections: 8,
        ..Config::for_tests()
    };
    let pool = db::connect(&config).await.unwrap();
    db::migrate(&pool).await.unwrap();
    (pool, TempDb { dir })
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    create_router(AppState { db: pool })
}

/// Insert a user with `<username>@example.com` as email.
pub async fn create_user(pool: &SqlitePool, username: &str) -> UserId {
    let id = UserId::new();
    let user = db::NewUser {
        id: id.clone(),
        username: Username::new(username).unwrap(),
        email: Email::new(format!("{}@example.com", username)).unwrap(),
    };
    db::users::insert(pool, &user).await.unwrap();
    id
}

pub async fn create_organization(pool: &SqlitePool, name: &str) -> OrganizationId {
    let id = OrganizationId::new();
    let organization = db::NewOrganization {
        id: id.clone(),
        name: name.to_string(),
    };
    db::organizations::insert(pool, &organization).await.unwrap();
    id
}

pub async fn create_project(pool: &SqlitePool, organization_id: &OrganizationId, name: &str) -> ProjectId {
    let id = ProjectId::new();
    let project = db::NewProject {
        id: id.clone(),
        organization_id: organization_id.clone(),
        name: name.to_string(),
    };
    db::projects::insert(pool, &project).await.unwrap();
    id
}

/// Project memberships the user holds across an organization's projects.
pub async fn project_memberships_in(pool: &SqlitePool, organization_id: &OrganizationId, user_id: &UserId) -> i64 {
    sqlx::query_scalar(
        "SELECT count(*) FROM project_members pm \
         JOIN projects p ON p.id = pm.project_id \
         WHERE p.organization_id = ? AND pm.user_id = ?",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Send a request with an optional JSON body; return status and parsed JSON (Null when empty).
pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (http::StatusCode, serde_json::Value) {
    let builder = http::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
