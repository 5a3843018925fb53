use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::controllers::driver_controller::DriverController;
use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverResponse, UpdateDriverRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{driver::DriverFilters, user::UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

const WRITERS: &[UserRole] = &[UserRole::Manager, UserRole::SafetyOfficer];

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route(
            "/:id",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DriverResponse>>), AppError> {
    user.require_role(WRITERS, "create driver")?;
    let controller = DriverController::new(state.store.clone());
    let response = controller.create(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverResponse>, AppError> {
    let controller = DriverController::new(state.store.clone());
    let response = controller.get_by_id(id, Utc::now().date_naive()).await?;
    Ok(Json(response))
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(filters): Query<DriverFilters>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.store.clone());
    let response = controller.list(&filters, Utc::now().date_naive()).await?;
    Ok(Json(response))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    user.require_role(WRITERS, "update driver")?;
    let controller = DriverController::new(state.store.clone());
    let response = controller
        .update(id, request, Utc::now().date_naive())
        .await?;
    Ok(Json(response))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_role(WRITERS, "delete driver")?;
    let controller = DriverController::new(state.store.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Driver deleted".to_string())))
}
