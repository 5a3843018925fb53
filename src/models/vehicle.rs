//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, su estado y los filtros de búsqueda.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    OnTrip,
    InShop,
    Retired,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::OnTrip => "on_trip",
            VehicleStatus::InShop => "in_shop",
            VehicleStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: Option<String>,
    pub model: Option<String>,
    pub plate: String,
    pub vehicle_type: Option<String>,
    /// Carga máxima en kg
    pub capacity: f64,
    pub odometer: f64,
    pub region: Option<String>,
    pub status: VehicleStatus,
    pub acquisition_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }
}

/// Filtros para búsqueda de vehículos (`?type=Van&status=available&region=North`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub status: Option<VehicleStatus>,
    pub region: Option<String>,
}

impl VehicleFilters {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.vehicle_type
            .as_ref()
            .map_or(true, |t| vehicle.vehicle_type.as_ref() == Some(t))
            && self.status.map_or(true, |s| vehicle.status == s)
            && self
                .region
                .as_ref()
                .map_or(true, |r| vehicle.region.as_ref() == Some(r))
    }
}
