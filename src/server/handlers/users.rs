use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::domain::{Id, UserInput, UserView};
use crate::error::YardError;
use crate::server::error::Result;
use crate::server::state::AppState;
use crate::store::{Page, PageRequest};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageRequest>,
) -> Json<Page<UserView>> {
    Json(state.store.list_users(page).await.map(|u| UserView::from(&u)))
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<Json<UserView>> {
    let user = state.store.get_user(id).await?;
    Ok(Json(UserView::from(&user)))
}

pub async fn by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<UserView>> {
    let user = state
        .store
        .find_user_by_email(&email)
        .await
        .ok_or_else(|| YardError::not_found("user with email", &email))?;
    Ok(Json(UserView::from(&user)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<UserInput>,
) -> Result<(StatusCode, Json<UserView>)> {
    let user = state.auth.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(input): Json<UserInput>,
) -> Result<Json<UserView>> {
    Ok(Json(state.auth.update_user(id, input).await?))
}

pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<Id>) -> Result<StatusCode> {
    state.store.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
