use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{AuthResponse, LoginRequest};
use crate::domain::UserInput;
use crate::server::error::Result;
use crate::server::state::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    Ok(Json(state.auth.login(request).await?))
}
