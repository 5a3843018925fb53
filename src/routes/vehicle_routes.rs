use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    user::UserRole,
    vehicle::{Vehicle, VehicleFilters},
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

const WRITERS: &[UserRole] = &[UserRole::Manager];

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    user.require_role(WRITERS, "create vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.create(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.list(&filters).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    user.require_role(WRITERS, "update vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_role(WRITERS, "delete vehicle")?;
    let controller = VehicleController::new(state.store.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Vehicle deleted".to_string())))
}
