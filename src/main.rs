use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod db;
mod models;
mod releases;

use auth::ApiKey;
use config::Config;
use db::{Database, ReleaseRepository};

#[derive(Clone)]
pub struct AppState {
    db: Database,
    release_repo: Arc<ReleaseRepository>,
    api_key: Arc<ApiKey>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loop_releases=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize database with migrations
    let db = db::init_db(&config.db_path).await?;
    let release_repo = Arc::new(ReleaseRepository::new(db.inner().clone()));
    info!(
        "Database {} initialized ({} releases)",
        config.db_path,
        release_repo.count().await?
    );

    let state = AppState {
        db,
        release_repo,
        api_key: Arc::new(ApiKey::new(config.api_key)),
    };

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", config.listen_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(releases::routes())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = match sqlx::query("SELECT 1").execute(state.db.inner()).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
