use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{maintenance::MaintenanceLog, vehicle::Vehicle};
use crate::utils::validation::validate_amount;

// Request para abrir un mantenimiento
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Uuid,
    #[validate(length(max = 100))]
    pub service_type: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_amount")]
    pub cost: Option<Decimal>,
    /// Por defecto la fecha del día
    pub date: Option<NaiveDate>,
}

// Response del cierre de mantenimiento
#[derive(Debug, Serialize)]
pub struct ResolveMaintenanceResponse {
    pub log: MaintenanceLog,
    pub vehicle: Vehicle,
    pub open_logs_remaining: usize,
}
