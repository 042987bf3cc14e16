use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::{Id, Motorcycle, MotorcycleInput, Position};
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Motorcycle>> {
    Json(state.store.list_motorcycles(page).await)
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<Json<Motorcycle>> {
    Ok(Json(state.store.get_motorcycle(id).await?))
}

pub async fn by_plate(
    State(state): State<Arc<AppState>>,
    Path(prefix): Path<String>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Motorcycle>> {
    Json(state.store.motorcycles_by_plate(&prefix, page).await)
}

pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Motorcycle>> {
    Json(state.store.motorcycles_by_status(&status, page).await)
}

pub async fn positions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<Position>>> {
    Ok(Json(state.store.positions_of_motorcycle(id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MotorcycleInput>,
) -> Result<(StatusCode, Json<Motorcycle>)> {
    let motorcycle = state.store.create_motorcycle(input).await?;
    tracing::info!(motorcycle_id = motorcycle.id, plate = %motorcycle.plate, "Motorcycle registered");
    Ok((StatusCode::CREATED, Json(motorcycle)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(input): Json<MotorcycleInput>,
) -> Result<Json<Motorcycle>> {
    Ok(Json(state.store.update_motorcycle(id, input).await?))
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<StatusCode> {
    state.store.delete_motorcycle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
