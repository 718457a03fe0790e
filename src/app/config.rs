/// Centralized environment configuration.
/// All env vars and defaults are defined here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Required.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    /// Default: 0.0.0.0:3000
    pub bind_addr: String,

    /// Upper bound on pooled SQLite connections.
    /// Default: 5
    pub db_max_connections: u32,

    /// How long a connection waits on a locked database before failing.
    /// Default: 5000
    pub db_busy_timeout_ms: u64,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error if required vars are missing or malformed.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env")?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a positive integer")?;
        if db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be a positive integer".to_string());
        }

        let db_busy_timeout_ms = std::env::var("DB_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .map_err(|_| "DB_BUSY_TIMEOUT_MS must be a number of milliseconds")?;

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            db_busy_timeout_ms,
        })
    }

    /// Config for tests. Uses an in-memory database, which exists per connection,
    /// so the pool is held to a single connection.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            db_busy_timeout_ms: 5000,
        }
    }
}
