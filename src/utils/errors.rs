//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::{driver::DriverStatus, trip::TripStatus, vehicle::VehicleStatus};

/// Reglas de negocio violadas por una petición (se traduce a 400)
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    #[error("Cargo {cargo_weight}kg exceeds vehicle capacity {capacity}kg")]
    CapacityExceeded { cargo_weight: f64, capacity: f64 },

    #[error("Driver license is expired or missing")]
    LicenseInvalid { license_expiry: Option<NaiveDate> },

    #[error("License mismatch: driver holds '{license_category}' license but vehicle is a '{vehicle_type}'")]
    LicenseMismatch {
        license_category: String,
        vehicle_type: String,
    },

    #[error("Cannot move trip from '{from}' to '{to}'")]
    InvalidTransition { from: TripStatus, to: String },

    #[error("End odometer {end_odometer} is below start odometer {start_odometer}")]
    OdometerRegression {
        start_odometer: f64,
        end_odometer: f64,
    },

    #[error("Field '{field}' is required")]
    MissingField { field: &'static str },

    #[error("Field '{field}' cannot be set to '{value}'")]
    FieldNotAllowed { field: &'static str, value: String },
}

/// Conflictos de estado entre entidades (se traduce a 409)
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "conflict", rename_all = "snake_case")]
pub enum StateConflict {
    #[error("Vehicle is {status}, not available")]
    VehicleUnavailable { vehicle_id: Uuid, status: VehicleStatus },

    #[error("Driver is {status}")]
    DriverUnavailable { driver_id: Uuid, status: DriverStatus },

    #[error("Maintenance log {log_id} is already resolved")]
    MaintenanceResolved { log_id: Uuid },

    #[error("{entity} {id} was modified concurrently, retry the operation")]
    StaleWrite { entity: &'static str, id: Uuid },

    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity} {id} is referenced by other records")]
    Referenced { entity: &'static str, id: Uuid },
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Validation error: {0}")]
    Rule(#[from] RuleViolation),

    #[error("Conflict: {0}")]
    Conflict(#[from] StateConflict),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Rule(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ {}", self);
        } else {
            warn!("⚠️ {}", self);
        }

        let error_response = match self {
            AppError::Database(e) => ErrorResponse {
                error: "Database Error".to_string(),
                message: "An error occurred while accessing the database".to_string(),
                details: Some(json!({ "sql_error": e.to_string() })),
                code: Some("DB_ERROR".to_string()),
            },

            AppError::Validation(e) => ErrorResponse {
                error: "Validation Error".to_string(),
                message: "The provided data is invalid".to_string(),
                details: Some(json!(e)),
                code: Some("VALIDATION_ERROR".to_string()),
            },

            AppError::Rule(rule) => ErrorResponse {
                error: "Validation Error".to_string(),
                message: rule.to_string(),
                details: Some(json!(rule)),
                code: Some("VALIDATION_ERROR".to_string()),
            },

            AppError::Conflict(conflict) => ErrorResponse {
                error: "Conflict".to_string(),
                message: conflict.to_string(),
                details: Some(json!(conflict)),
                code: Some("CONFLICT".to_string()),
            },

            AppError::Unauthorized(msg) => ErrorResponse {
                error: "Unauthorized".to_string(),
                message: msg,
                details: None,
                code: Some("UNAUTHORIZED".to_string()),
            },

            AppError::Forbidden(msg) => ErrorResponse {
                error: "Forbidden".to_string(),
                message: msg,
                details: None,
                code: Some("FORBIDDEN".to_string()),
            },

            AppError::NotFound(msg) => ErrorResponse {
                error: "Not Found".to_string(),
                message: msg,
                details: None,
                code: Some("NOT_FOUND".to_string()),
            },

            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg,
                details: None,
                code: Some("BAD_REQUEST".to_string()),
            },

            AppError::Internal(msg) => ErrorResponse {
                error: "Internal Server Error".to_string(),
                message: "An unexpected error occurred".to_string(),
                details: Some(json!({ "internal_error": msg })),
                code: Some("INTERNAL_ERROR".to_string()),
            },

            AppError::Jwt(msg) => ErrorResponse {
                error: "JWT Error".to_string(),
                message: msg,
                details: None,
                code: Some("JWT_ERROR".to_string()),
            },

            AppError::Hash(msg) => ErrorResponse {
                error: "Hash Error".to_string(),
                message: "An error occurred while processing credentials".to_string(),
                details: Some(json!({ "hash_error": msg })),
                code: Some("HASH_ERROR".to_string()),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}
