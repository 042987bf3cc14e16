use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::{DistanceMeasurement, Id, MeasurementInput};
use crate::prediction::{PredictionRequest, PredictionResult};
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<DistanceMeasurement>> {
    Json(state.store.list_measurements(page).await)
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Result<Json<DistanceMeasurement>> {
    Ok(Json(state.store.get_measurement(id).await?))
}

pub async fn by_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Query(page): Query<PageRequest>,
) -> Json<Page<DistanceMeasurement>> {
    Json(state.store.measurements_by_position(id, page).await)
}

pub async fn by_marker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Query(page): Query<PageRequest>,
) -> Json<Page<DistanceMeasurement>> {
    Json(state.store.measurements_by_marker(id, page).await)
}

pub async fn count_by_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> Json<usize> {
    Json(state.store.count_measurements_by_position(id).await)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MeasurementInput>,
) -> Result<(StatusCode, Json<DistanceMeasurement>)> {
    let measurement = state.store.create_measurement(input).await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

/// Retrains on all stored measurements and predicts the distance between
/// the requested position and fixed marker.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResult>> {
    Ok(Json(state.predictions.predict_distance(request).await?))
}
