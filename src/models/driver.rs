//! Modelo de Driver
//!
//! Conductores con su licencia, estado operativo y puntuación de seguridad.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Puntuación máxima de seguridad
pub const MAX_SAFETY_SCORE: f64 = 100.0;

/// Estado del conductor - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    OnDuty,
    OffDuty,
    Suspended,
    OnTrip,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::OnDuty => "on_duty",
            DriverStatus::OffDuty => "off_duty",
            DriverStatus::Suspended => "suspended",
            DriverStatus::OnTrip => "on_trip",
        }
    }

    /// Un conductor suspendido o en viaje no puede recibir otro viaje
    pub fn is_assignable(&self) -> bool {
        !matches!(self, DriverStatus::Suspended | DriverStatus::OnTrip)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub license_category: Option<String>,
    pub status: DriverStatus,
    pub safety_score: f64,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// La licencia es válida si tiene fecha de expiración y no ha pasado
    pub fn is_license_valid(&self, today: NaiveDate) -> bool {
        self.license_expiry.map_or(false, |expiry| expiry >= today)
    }

    /// Suma un punto por viaje completado, sin superar el máximo
    pub fn reward_completed_trip(&mut self) {
        self.safety_score = (self.safety_score + 1.0).min(MAX_SAFETY_SCORE);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverFilters {
    pub status: Option<DriverStatus>,
}

impl DriverFilters {
    pub fn matches(&self, driver: &Driver) -> bool {
        self.status.map_or(true, |s| driver.status == s)
    }
}
