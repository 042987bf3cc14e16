//! API route definitions

use std::sync::Arc;
use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::require_bearer;

use super::{handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. See /api/health to check API status.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed for this route.",
        })),
    )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Motorcycles
        .route(
            "/motorcycles",
            get(handlers::motorcycles::list).post(handlers::motorcycles::create),
        )
        .route(
            "/motorcycles/:id",
            get(handlers::motorcycles::get)
                .put(handlers::motorcycles::update)
                .delete(handlers::motorcycles::delete),
        )
        .route("/motorcycles/:id/positions", get(handlers::motorcycles::positions))
        .route("/motorcycles/plate/:prefix", get(handlers::motorcycles::by_plate))
        .route("/motorcycles/status/:status", get(handlers::motorcycles::by_status))
        // Yards
        .route("/yards", get(handlers::yards::list).post(handlers::yards::create))
        .route("/yards/with-relations", get(handlers::yards::with_relations))
        .route(
            "/yards/:id",
            get(handlers::yards::get)
                .put(handlers::yards::update)
                .delete(handlers::yards::delete),
        )
        .route("/yards/:id/motorcycles", get(handlers::yards::motorcycles))
        // Positions
        .route(
            "/positions",
            get(handlers::positions::list).post(handlers::positions::create),
        )
        .route("/positions/in-review", get(handlers::positions::in_review))
        .route("/positions/motorcycle/:id", get(handlers::positions::by_motorcycle))
        .route("/positions/history/:motorcycle_id", get(handlers::positions::history))
        .route(
            "/positions/:id",
            get(handlers::positions::get)
                .put(handlers::positions::update)
                .delete(handlers::positions::delete),
        )
        // Markers
        .route(
            "/fixed-markers",
            get(handlers::markers::list_fixed).post(handlers::markers::create_fixed),
        )
        .route("/fixed-markers/search", get(handlers::markers::search_fixed))
        .route("/fixed-markers/yard/:yard_id", get(handlers::markers::fixed_in_yard))
        .route(
            "/fixed-markers/:id",
            get(handlers::markers::get_fixed).delete(handlers::markers::delete_fixed),
        )
        .route(
            "/mobile-markers",
            get(handlers::markers::list_mobile).post(handlers::markers::create_mobile),
        )
        .route("/mobile-markers/search", get(handlers::markers::search_mobile))
        .route(
            "/mobile-markers/motorcycle/:id",
            get(handlers::markers::mobile_of_motorcycle),
        )
        .route(
            "/mobile-markers/:id",
            get(handlers::markers::get_mobile)
                .put(handlers::markers::update_mobile)
                .delete(handlers::markers::delete_mobile),
        )
        // Measurements and prediction
        .route(
            "/measurements",
            get(handlers::measurements::list).post(handlers::measurements::create),
        )
        .route("/measurements/prediction", post(handlers::measurements::predict))
        .route("/measurements/position/:id", get(handlers::measurements::by_position))
        .route(
            "/measurements/fixed-marker/:id",
            get(handlers::measurements::by_marker),
        )
        .route(
            "/measurements/count/position/:id",
            get(handlers::measurements::count_by_position),
        )
        .route("/measurements/:id", get(handlers::measurements::get))
        // Users
        .route("/users", get(handlers::users::list).post(handlers::users::create))
        .route("/users/email/:email", get(handlers::users::by_email))
        .route(
            "/users/:id",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        // System
        .route("/system/status", get(handlers::system::status))
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::system::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let protected = protected_routes().route_layer(axum_middleware::from_fn_with_state(
        state.auth.clone(),
        require_bearer,
    ));

    let api_routes = public
        .merge(protected)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state);

    // CORS configured via CORS_ORIGIN env var (default: allow all)
    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<axum::http::HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS_ORIGIN, allowing all origins");
                CorsLayer::permissive()
            }
        },
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}
