//! Modelo de FuelLog
//!
//! Cargas de combustible y gastos varios asociados a un vehículo y,
//! opcionalmente, a un viaje.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FuelLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub liters: f64,
    pub cost: Decimal,
    pub misc_expense: Decimal,
    pub distance_km: f64,
    pub odometer_at_fill: Option<f64>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuelFilters {
    pub vehicle_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FuelFilters {
    pub fn matches(&self, log: &FuelLog) -> bool {
        self.vehicle_id.map_or(true, |id| log.vehicle_id == id)
            && self.trip_id.map_or(true, |id| log.trip_id == Some(id))
            && self.date_from.map_or(true, |from| log.date >= from)
            && self.date_to.map_or(true, |to| log.date <= to)
    }
}
