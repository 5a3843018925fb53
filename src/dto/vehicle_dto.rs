use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::vehicle::VehicleStatus;
use crate::utils::validation::{validate_amount, validate_not_blank};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 20), custom = "validate_not_blank")]
    pub plate: String,
    #[validate(length(max = 20))]
    pub vehicle_type: Option<String>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub capacity: f64,
    #[validate(range(min = 0.0, max = 10000000.0))]
    pub odometer: Option<f64>,
    #[validate(length(max = 50))]
    pub region: Option<String>,
    #[validate(custom = "validate_amount")]
    pub acquisition_cost: Option<Decimal>,
}

// Request para actualizar un vehículo
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub model: Option<String>,
    #[validate(length(max = 20))]
    pub vehicle_type: Option<String>,
    #[validate(length(max = 50))]
    pub region: Option<String>,
    #[validate(range(min = 0.0, max = 10000000.0))]
    pub odometer: Option<f64>,
    #[validate(custom = "validate_amount")]
    pub acquisition_cost: Option<Decimal>,
    /// Solo se acepta `retired`
    pub status: Option<VehicleStatus>,
}
