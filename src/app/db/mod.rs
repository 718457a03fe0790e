pub mod organization_members;
pub mod organizations;
pub mod project_members;
pub mod projects;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::app::config::Config;
use crate::app::domain::Role;

pub use organizations::{NewOrganization, Organization};
pub use projects::{NewProject, Project};
pub use users::{NewUser, User};

/// Open the connection pool described by config. WAL keeps readers off the
/// writer's lock; the busy timeout applies to every pooled connection.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(config.db_busy_timeout_ms));

    SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// Run embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Parse a stored role label. Unknown labels surface as decode errors, never as a default role.
pub(crate) fn decode_role(label: &str) -> Result<Role, sqlx::Error> {
    Role::from_str(label).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// True when the error is SQLite rejecting a duplicate primary/unique key.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
