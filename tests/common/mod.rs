//! Helpers compartidos de los tests de integración

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use fleet_ops::{
    build_router, config::environment::EnvironmentConfig, repositories::MemoryFleetStore,
    state::AppState,
};

/// Router completo sobre un store en memoria vacío
pub fn create_test_router() -> Router {
    let config = EnvironmentConfig {
        jwt_secret: "integration-secret".to_string(),
        bcrypt_cost: 4,
        ..EnvironmentConfig::default()
    };
    build_router(AppState::new(Arc::new(MemoryFleetStore::new()), config))
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}

/// Registra un usuario con el rol dado y devuelve su token
pub async fn token_for(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = json_request(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "secret123", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = json_request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

pub struct Staff {
    pub manager: String,
    pub dispatcher: String,
    pub analyst: String,
    pub safety_officer: String,
}

pub async fn staff(app: &Router) -> Staff {
    Staff {
        manager: token_for(app, "manager@fleet.io", "manager").await,
        dispatcher: token_for(app, "dispatch@fleet.io", "dispatcher").await,
        analyst: token_for(app, "analyst@fleet.io", "analyst").await,
        safety_officer: token_for(app, "safety@fleet.io", "safety_officer").await,
    }
}

/// Crea un vehículo como manager y devuelve su id
pub async fn create_vehicle(app: &Router, token: &str, body: Value) -> String {
    let (status, response) = json_request(app, "POST", "/vehicles", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);
    response["data"]["id"].as_str().unwrap().to_string()
}

/// Crea un conductor y devuelve su id
pub async fn create_driver(app: &Router, token: &str, body: Value) -> String {
    let (status, response) = json_request(app, "POST", "/drivers", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", response);
    response["data"]["id"].as_str().unwrap().to_string()
}
