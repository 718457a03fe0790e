use dotenvy::dotenv;
use transloom::app;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (silently ignore if missing)
    dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from environment
    let config = app::config::Config::from_env()
        .expect("Failed to load config (check DATABASE_URL and other env vars)");

    // Only this process may write the membership database
    let _db_lock = match app::single_writer::acquire(&config.database_url) {
        Ok(guard) => guard,
        Err(msg) => {
            tracing::error!("{}", msg);
            std::process::exit(1);
        }
    };

    // Connect to SQLite (WAL + busy timeout on every pooled connection)
    let pool = app::db::connect(&config)
        .await
        .expect("Failed to connect to database");

    // Run embedded migrations on startup
    app::db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");

    // Report invariant violations left by out-of-band writes; resolution fails closed on them
    if let Err(err) = app::memberships::audit::verify_consistency(&pool).await {
        tracing::error!(%err, "membership store failed consistency check");
    }

    let bind_addr = config.bind_addr.clone();
    let state = app::AppState { db: pool };
    let router = transloom::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", bind_addr, e));

    tracing::info!("{} listening on http://{}", app::APP_NAME, bind_addr);

    axum::serve(listener, router).await.unwrap();
}
