//! Utilidades de validación
//!
//! Validadores custom para `validator` y el extractor `ValidatedJson`, que
//! deserializa el body y ejecuta `Validate` antes de llegar al handler.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::utils::errors::AppError;

/// Monto máximo aceptado en cualquier campo de dinero
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Validar que un monto esté entre 0 y `MAX_AMOUNT`
pub fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("actual".into(), &value.to_string());
        return Err(error);
    }
    if *value > Decimal::from(MAX_AMOUNT) {
        let mut error = ValidationError::new("max_amount");
        error.add_param("actual".into(), &value.to_string());
        error.add_param("max".into(), &MAX_AMOUNT);
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Body JSON deserializado y validado
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
