use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserRole;

// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    /// Por defecto `dispatcher`
    pub role: Option<UserRole>,
}

// Register response (sin password)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckEmailRequest {
    #[validate(length(min = 1))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}
