use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;

use crate::controllers::fuel_controller::FuelController;
use crate::dto::api_response::ApiResponse;
use crate::dto::fuel_dto::CreateFuelLogRequest;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    fuel::{FuelFilters, FuelLog},
    user::UserRole,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

const WRITERS: &[UserRole] = &[UserRole::Manager, UserRole::Dispatcher];

pub fn create_fuel_router() -> Router<AppState> {
    Router::new().route("/", get(list_fuel_logs).post(create_fuel_log))
}

async fn create_fuel_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateFuelLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FuelLog>>), AppError> {
    user.require_role(WRITERS, "record fuel")?;
    let controller = FuelController::new(state.store.clone());
    let response = controller.create(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_fuel_logs(
    State(state): State<AppState>,
    Query(filters): Query<FuelFilters>,
) -> Result<Json<Vec<FuelLog>>, AppError> {
    let controller = FuelController::new(state.store.clone());
    let response = controller.list(&filters).await?;
    Ok(Json(response))
}
