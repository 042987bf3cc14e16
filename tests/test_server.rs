//! Integration test: Server API endpoints

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use yardtrack::auth::JwtConfig;
use yardtrack::prediction::{PredictionConfig, WorkerConfig};
use yardtrack::server::{create_router, AppState, ServerConfig};
use yardtrack::store::Store;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_file: None,
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789".to_string(),
            issuer: "yardtrack".to_string(),
            audience: "yardtrack".to_string(),
            expiry_secs: 600,
        },
        prediction: PredictionConfig::default().with_min_training_samples(5),
        worker: WorkerConfig {
            queue_capacity: 16,
            max_concurrent_fits: 2,
        },
    }
}

fn test_app() -> axum::Router {
    let state = Arc::new(AppState::new(test_config(), Store::new()).unwrap());
    create_router(state)
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &axum::Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Operator",
            "email": email,
            "password": "s3cret-pass",
            "role": "ADMIN",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/yards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app, Method::GET, "/api/yards", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = test_app();
    register(&app, "ops@yard.example").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "OPS@yard.example", "password": "s3cret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ops@yard.example");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap();

    let (status, _) = send(&app, Method::GET, "/api/system/status", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ops@yard.example", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = test_app();
    register(&app, "dup@yard.example").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Other",
            "email": "dup@yard.example",
            "password": "another",
            "role": "USER",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_yard_crud() {
    let app = test_app();
    let token = register(&app, "crud@yard.example").await;
    let token = Some(token.as_str());

    let (status, yard) = send(
        &app,
        Method::POST,
        "/api/yards",
        token,
        Some(json!({ "name": "North Yard", "location": "Av. Paulista" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = yard["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/yards/{}", id), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "North Yard");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/yards/{}", id),
        token,
        Some(json!({ "name": "South Yard" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/yards/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/yards/{}", id), token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_paging_is_normalized() {
    let app = test_app();
    let token = register(&app, "pages@yard.example").await;
    let token = Some(token.as_str());

    for i in 0..12 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/yards",
            token,
            Some(json!({ "name": format!("Yard {}", i) })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, Method::GET, "/api/yards?page=0&size=500", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["size"], 10);
    assert_eq!(page["total"], 12);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 10);

    let (_, page) = send(&app, Method::GET, "/api/yards?page=2&size=10", token, None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_prediction_endpoint() {
    let app = test_app();
    let token = register(&app, "predict@yard.example").await;
    let token = Some(token.as_str());

    let coords = [(0.0, 0.0, 1.0, 1.0), (1.0, 2.0, 5.0, 0.0), (3.0, 1.0, 2.0, 2.0), (2.0, 5.0, 0.0, 6.0), (6.0, 3.0, 7.0, 7.0)];
    let mut first = None;
    for (i, (px, py, mx, my)) in coords.iter().enumerate() {
        let (status, position) = send(
            &app,
            Method::POST,
            "/api/positions",
            token,
            Some(json!({ "x": px, "y": py })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, marker) = send(
            &app,
            Method::POST,
            "/api/fixed-markers",
            token,
            Some(json!({ "aruco_code": format!("FX-{}", i), "x": mx, "y": my })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let pair = (position["id"].as_i64().unwrap(), marker["id"].as_i64().unwrap());
        first.get_or_insert(pair);

        // Too few samples until the fifth measurement lands.
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/measurements/prediction",
            token,
            Some(json!({ "position_id": pair.0, "marker_id": pair.1 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/measurements",
            token,
            Some(json!({ "distance": i as f64 + 1.5, "position_id": pair.0, "marker_id": pair.1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (position_id, marker_id) = first.unwrap();
    let (status, result) = send(
        &app,
        Method::POST,
        "/api/measurements/prediction",
        token,
        Some(json!({ "position_id": position_id, "marker_id": marker_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["training_sample_count"], 5);
    let predicted = result["predicted_distance"].as_f64().unwrap();
    assert!((predicted - 1.5).abs() < 1e-6);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/measurements/prediction",
        token,
        Some(json!({ "position_id": 999, "marker_id": marker_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);

    let (status, count) = send(
        &app,
        Method::GET,
        &format!("/api/measurements/count/position/{}", position_id),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_referenced_yard_cannot_be_deleted() {
    let app = test_app();
    let token = register(&app, "refs@yard.example").await;
    let token = Some(token.as_str());

    let (_, yard) = send(&app, Method::POST, "/api/yards", token, Some(json!({ "name": "Main" }))).await;
    let yard_id = yard["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/fixed-markers",
        token,
        Some(json!({ "aruco_code": "FX-1", "x": 1.0, "y": 1.0, "yard_id": yard_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/yards/{}", yard_id), token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/fixed-markers",
        token,
        Some(json!({ "aruco_code": "FX-2", "yard_id": 4242 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_mobile_marker_routes() {
    let app = test_app();
    let token = register(&app, "mobile@yard.example").await;
    let token = Some(token.as_str());

    let (status, moto) = send(
        &app,
        Method::POST,
        "/api/motorcycles",
        token,
        Some(json!({ "plate": "XYZ9K87", "model": "Mottu Sport", "status": "ativa" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let moto_id = moto["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::GET, &format!("/api/mobile-markers/motorcycle/{}", moto_id), token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, marker) = send(
        &app,
        Method::POST,
        "/api/mobile-markers",
        token,
        Some(json!({ "aruco_code": "Mv-10", "motorcycle_id": moto_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let marker_id = marker["id"].as_i64().unwrap();

    let (status, found) = send(&app, Method::GET, "/api/mobile-markers/search?code=MV-10", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], marker_id);

    let (status, found) = send(&app, Method::GET, &format!("/api/mobile-markers/motorcycle/{}", moto_id), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], marker_id);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/motorcycles/{}", moto_id), token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/mobile-markers/{}", marker_id),
        token,
        Some(json!({ "aruco_code": "MV-11" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["aruco_code"], "MV-11");
    assert!(updated["motorcycle_id"].is_null());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/mobile-markers/{}", marker_id), token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/motorcycles/{}", moto_id), token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
