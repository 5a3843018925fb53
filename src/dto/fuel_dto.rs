use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_amount;

// Request para registrar una carga de combustible
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFuelLogRequest {
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub liters: f64,
    #[validate(custom = "validate_amount")]
    pub cost: Decimal,
    #[validate(custom = "validate_amount")]
    pub misc_expense: Option<Decimal>,
    #[validate(range(min = 0.0, max = 10000000.0))]
    pub distance_km: Option<f64>,
    #[validate(range(min = 0.0, max = 10000000.0))]
    pub odometer_at_fill: Option<f64>,
    /// Por defecto la fecha del día
    pub date: Option<NaiveDate>,
}
