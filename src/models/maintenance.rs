//! Modelo de MaintenanceLog

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub cost: Decimal,
    pub date: NaiveDate,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceFilters {
    pub vehicle_id: Option<Uuid>,
    pub resolved: Option<bool>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl MaintenanceFilters {
    pub fn open_for_vehicle(vehicle_id: Uuid) -> Self {
        Self {
            vehicle_id: Some(vehicle_id),
            resolved: Some(false),
            ..Self::default()
        }
    }

    pub fn matches(&self, log: &MaintenanceLog) -> bool {
        self.vehicle_id.map_or(true, |id| log.vehicle_id == id)
            && self.resolved.map_or(true, |r| log.resolved == r)
            && self.date_from.map_or(true, |from| log.date >= from)
            && self.date_to.map_or(true, |to| log.date <= to)
    }
}
