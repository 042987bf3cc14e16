use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::{Id, Position, PositionInput};
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Position>> {
    Json(state.store.list_positions(page).await)
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<Json<Position>> {
    Ok(Json(state.store.get_position(id).await?))
}

pub async fn by_motorcycle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Position>> {
    Json(state.store.positions_by_motorcycle(id, page).await)
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(motorcycle_id): Path<Id>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Position>> {
    Json(state.store.position_history(motorcycle_id, page).await)
}

pub async fn in_review(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Position>> {
    Json(state.store.positions_in_review(page).await)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PositionInput>,
) -> Result<(StatusCode, Json<Position>)> {
    let position = state.store.create_position(input).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(input): Json<PositionInput>,
) -> Result<Json<Position>> {
    Ok(Json(state.store.update_position(id, input).await?))
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<StatusCode> {
    state.store.delete_position(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
