use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::db::LATEST_LIMIT;
use crate::models::{Channel, Release};
use crate::AppState;

pub use error::ApiError;
use params::{AddParams, QueryPairs, RemoveParams};

mod error;
mod params;

pub fn routes() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/latest", axum::routing::get(latest))
        .route("/latest/stable", axum::routing::get(latest_stable))
        .route("/latest/prerelease", axum::routing::get(latest_prerelease))
        .route("/add", axum::routing::get(add_release))
        .route("/remove", axum::routing::get(remove_release))
}

/// GET /latest
/// Newest release of either channel. An empty registry yields a default record.
async fn latest(State(state): State<AppState>) -> Result<Json<Release>, ApiError> {
    let release = state.release_repo.latest().await?;
    Ok(Json(release.unwrap_or_default()))
}

/// GET /latest/stable
async fn latest_stable(State(state): State<AppState>) -> Result<Json<Vec<Release>>, ApiError> {
    latest_in(&state, Channel::Stable).await
}

/// GET /latest/prerelease
async fn latest_prerelease(
    State(state): State<AppState>,
) -> Result<Json<Vec<Release>>, ApiError> {
    latest_in(&state, Channel::Prerelease).await
}

async fn latest_in(state: &AppState, channel: Channel) -> Result<Json<Vec<Release>>, ApiError> {
    let releases = state
        .release_repo
        .latest_by_channel(channel, LATEST_LIMIT)
        .await?;
    tracing::debug!("Serving {} {} releases", releases.len(), channel);
    Ok(Json(releases))
}

/// GET /add?v=&r=&b=&pr=&pl=&a=&i=&l=&key=
/// Publish a release
async fn add_release(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let request = AddParams::from(pairs).require()?;

    if !state.api_key.verify(&request.key) {
        return Err(ApiError::WrongKey);
    }

    let release = request.into_release()?;
    if !state.release_repo.insert(&release).await? {
        return Err(ApiError::AlreadyPresent);
    }

    Ok("ok")
}

/// GET /remove?v=&b=&pl=&a=&key=
/// Withdraw a release
async fn remove_release(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let request = RemoveParams::from(pairs).require()?;

    if !state.api_key.verify(&request.key) {
        return Err(ApiError::WrongKey);
    }

    let key = request.into_key()?;
    if !state.release_repo.delete(&key).await? {
        return Err(ApiError::NotFound);
    }

    Ok("ok")
}
