use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::trip_dto::{CreateTripRequest, TransitionTripRequest, TripResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{trip::TripFilters, user::UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

const WRITERS: &[UserRole] = &[UserRole::Manager, UserRole::Dispatcher];

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/:id", get(get_trip).put(transition_trip))
}

async fn create_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TripResponse>>), AppError> {
    user.require_role(WRITERS, "create trip")?;
    let trip = state.trips().create(request, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            TripResponse::from(trip),
            "Trip created".to_string(),
        )),
    ))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.trips().get(id).await?;
    Ok(Json(TripResponse::from(trip)))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state.trips().list(&filters).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect()))
}

async fn transition_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<TransitionTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    user.require_role(WRITERS, "update trip")?;
    let trip = state.trips().transition(id, request, Utc::now()).await?;
    let message = format!("Trip {}", trip.status);
    Ok(Json(ApiResponse::success_with_message(
        TripResponse::from(trip),
        message,
    )))
}
