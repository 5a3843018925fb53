use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::maintenance_dto::{CreateMaintenanceRequest, ResolveMaintenanceResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    maintenance::{MaintenanceFilters, MaintenanceLog},
    user::UserRole,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

const WRITERS: &[UserRole] = &[UserRole::Manager];

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenance).post(open_maintenance))
        .route("/:id/resolve", put(resolve_maintenance))
}

async fn open_maintenance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceLog>>), AppError> {
    user.require_role(WRITERS, "open maintenance")?;
    let log = state.maintenance().open(request, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            log,
            "Maintenance opened".to_string(),
        )),
    ))
}

async fn resolve_maintenance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResolveMaintenanceResponse>>, AppError> {
    user.require_role(WRITERS, "resolve maintenance")?;
    let response = state.maintenance().resolve(id).await?;
    let message = format!("Vehicle is {}", response.vehicle.status);
    Ok(Json(ApiResponse::success_with_message(response, message)))
}

async fn list_maintenance(
    State(state): State<AppState>,
    Query(filters): Query<MaintenanceFilters>,
) -> Result<Json<Vec<MaintenanceLog>>, AppError> {
    let logs = state.maintenance().list(&filters).await?;
    Ok(Json(logs))
}
