use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    analytics::{DriverReport, FleetDashboard, MonthlyFilters, MonthlyReport, VehicleReport},
    user::UserRole,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

const READERS: &[UserRole] = &[UserRole::Manager, UserRole::Analyst];

pub fn create_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/", get(vehicle_analytics))
        .route("/drivers", get(driver_analytics))
        .route("/monthly", get(monthly_analytics))
}

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

async fn vehicle_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<VehicleReport>>, AppError> {
    user.require_role(READERS, "view analytics")?;
    let report = state.analytics().vehicle_reports().await?;
    Ok(Json(report))
}

async fn driver_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DriverReport>>, AppError> {
    user.require_role(READERS, "view analytics")?;
    let report = state
        .analytics()
        .driver_reports(Utc::now().date_naive())
        .await?;
    Ok(Json(report))
}

async fn monthly_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<MonthlyFilters>,
) -> Result<Json<Vec<MonthlyReport>>, AppError> {
    user.require_role(READERS, "view analytics")?;
    let report = state.analytics().monthly(&filters).await?;
    Ok(Json(report))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<FleetDashboard>, AppError> {
    let dashboard = state.analytics().dashboard().await?;
    Ok(Json(dashboard))
}
