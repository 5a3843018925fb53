use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::dto::api_response::ApiResponse;
use crate::dto::auth_dto::{
    CheckEmailRequest, CheckEmailResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedJson;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/check-email", post(check_email))
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), AppError> {
    let user = state.auth().register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(user, "Account created".to_string())),
    ))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth().login(request).await?;
    Ok(Json(response))
}

async fn check_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CheckEmailRequest>,
) -> Result<Json<CheckEmailResponse>, AppError> {
    let exists = state.auth().email_exists(&request.email).await?;
    Ok(Json(CheckEmailResponse { exists }))
}
