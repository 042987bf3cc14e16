use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::{Id, Motorcycle, Yard, YardInput};
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Yard>> {
    Json(state.store.list_yards(page).await)
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<Json<Yard>> {
    Ok(Json(state.store.get_yard(id).await?))
}

/// Yards referenced by at least one user, position or fixed marker.
pub async fn with_relations(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Yard>> {
    Json(state.store.yards_with_relations(page).await)
}

pub async fn motorcycles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Motorcycle>>> {
    Ok(Json(state.store.motorcycles_in_yard(id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<YardInput>,
) -> Result<(StatusCode, Json<Yard>)> {
    let yard = state.store.create_yard(input).await?;
    Ok((StatusCode::CREATED, Json(yard)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(input): Json<YardInput>,
) -> Result<Json<Yard>> {
    Ok(Json(state.store.update_yard(id, input).await?))
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<StatusCode> {
    state.store.delete_yard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
