//! Fleet Ops backend
//!
//! API JSON para gestión de flota: vehículos, conductores, viajes,
//! mantenimiento, combustible y analytics.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::auth_middleware, cors::cors_middleware};
use crate::routes::{
    analytics_routes, auth_routes, driver_routes, fuel_routes, maintenance_routes, trip_routes,
    vehicle_routes,
};
use crate::state::AppState;

/// Construir el router completo de la API
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/maintenance", maintenance_routes::create_maintenance_router())
        .nest("/fuel", fuel_routes::create_fuel_router())
        .nest("/dashboard", analytics_routes::create_dashboard_router())
        .nest("/analytics", analytics_routes::create_analytics_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let cors = cors_middleware(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes::create_auth_router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "fleet_ops",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
