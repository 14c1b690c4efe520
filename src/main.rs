use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use notedav::{config::Config, db::Database, path_locks::PathLocks, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;

    info!("running migrations");
    sqlx::migrate!("./migrations").run(&db.pool).await?;

    notedav::seed::seed_admin_user(&db, &config).await?;

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        locks: Arc::new(PathLocks::new()),
    });

    let app = Router::new()
        .route("/api/health", get(notedav::health_check))
        .merge(notedav::routes::dav::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    info!("WebDAV server starting on {}", config.server_address);

    axum::serve(listener, app).await?;

    Ok(())
}
