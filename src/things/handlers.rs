use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{NewThing, Thing, ThingUpdate};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn thing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/things", get(index).post(create))
        .route(
            "/api/things/:id",
            get(show).put(update).patch(update).delete(destroy),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Thing not found".into())
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> AppResult<Json<Vec<Thing>>> {
    Ok(Json(state.things.list().await?))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Thing>> {
    let thing = state.things.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(thing))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Json(mut payload): Json<NewThing>,
) -> AppResult<(StatusCode, Json<Thing>)> {
    payload.name = payload.name.trim().to_string();
    if payload.name.is_empty() {
        return Err(AppError::Validation("Thing name cannot be blank".into()));
    }
    let thing = state.things.create(payload).await?;
    info!(thing_id = %thing.id, "thing created");
    Ok((StatusCode::CREATED, Json(thing)))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ThingUpdate>,
) -> AppResult<Json<Thing>> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Thing name cannot be blank".into()));
    }
    let thing = state.things.update(id, payload).await?.ok_or_else(not_found)?;
    Ok(Json(thing))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    if !state.things.delete(id).await? {
        return Err(not_found());
    }
    info!(thing_id = %id, "thing deleted");
    Ok(StatusCode::NO_CONTENT)
}
