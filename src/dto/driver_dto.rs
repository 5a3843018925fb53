use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::driver::{Driver, DriverStatus};
use crate::utils::validation::validate_not_blank;

// Request para crear un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 50))]
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub license_category: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub safety_score: Option<f64>,
}

// Request para actualizar un conductor
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub license_category: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub safety_score: Option<f64>,
    /// `on_duty`, `off_duty` o `suspended`
    pub status: Option<DriverStatus>,
}

// Response de conductor con la validez de licencia calculada
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    #[serde(flatten)]
    pub driver: Driver,
    pub license_valid: bool,
}

impl DriverResponse {
    pub fn new(driver: Driver, today: NaiveDate) -> Self {
        let license_valid = driver.is_license_valid(today);
        Self {
            driver,
            license_valid,
        }
    }
}
