use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::CodeQuery;
use crate::domain::{FixedMarker, FixedMarkerInput, Id, MobileMarker, MobileMarkerInput};
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

// ---- fixed markers ----

pub async fn list_fixed(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<FixedMarker>> {
    Json(state.store.list_fixed_markers(page).await)
}

pub async fn get_fixed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<FixedMarker>> {
    Ok(Json(state.store.get_fixed_marker(id).await?))
}

pub async fn fixed_in_yard(
    State(state): State<Arc<AppState>>,
    Path(yard_id): Path<Id>,
    Query(page): Query<PageRequest>,
) -> Json<Page<FixedMarker>> {
    Json(state.store.fixed_markers_in_yard(yard_id, page).await)
}

pub async fn search_fixed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CodeQuery>,
) -> Result<Json<FixedMarker>> {
    Ok(Json(state.store.find_fixed_marker_by_code(&query.code).await?))
}

pub async fn create_fixed(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FixedMarkerInput>,
) -> Result<(StatusCode, Json<FixedMarker>)> {
    let marker = state.store.create_fixed_marker(input).await?;
    Ok((StatusCode::CREATED, Json(marker)))
}

pub async fn delete_fixed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<StatusCode> {
    state.store.delete_fixed_marker(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- mobile markers ----

pub async fn list_mobile(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<MobileMarker>> {
    Json(state.store.list_mobile_markers(page).await)
}

pub async fn get_mobile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<MobileMarker>> {
    Ok(Json(state.store.get_mobile_marker(id).await?))
}

pub async fn search_mobile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CodeQuery>,
) -> Result<Json<MobileMarker>> {
    Ok(Json(state.store.find_mobile_marker_by_code(&query.code).await?))
}

pub async fn mobile_of_motorcycle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<MobileMarker>> {
    Ok(Json(state.store.mobile_marker_of_motorcycle(id).await?))
}

pub async fn create_mobile(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MobileMarkerInput>,
) -> Result<(StatusCode, Json<MobileMarker>)> {
    let marker = state.store.create_mobile_marker(input).await?;
    Ok((StatusCode::CREATED, Json(marker)))
}

pub async fn update_mobile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(input): Json<MobileMarkerInput>,
) -> Result<Json<MobileMarker>> {
    Ok(Json(state.store.update_mobile_marker(id, input).await?))
}

pub async fn delete_mobile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<StatusCode> {
    state.store.delete_mobile_marker(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
