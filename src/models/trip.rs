//! Modelo de Trip
//!
//! Un viaje vincula un vehículo y un conductor. Se crea en `draft` y
//! termina en `completed` o `cancelled`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Draft,
    Dispatched,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Dispatched => "dispatched",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(TripStatus::Draft),
            "dispatched" => Some(TripStatus::Dispatched),
            "completed" => Some(TripStatus::Completed),
            "cancelled" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub cargo_weight: f64,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub status: TripStatus,
    pub start_odometer: Option<f64>,
    pub end_odometer: Option<f64>,
    pub estimated_fuel_cost: Decimal,
    pub revenue: Decimal,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Distancia recorrida; 0 si falta alguna lectura del odómetro
    pub fn distance_km(&self) -> f64 {
        match (self.start_odometer, self.end_odometer) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

impl TripFilters {
    pub fn matches(&self, trip: &Trip) -> bool {
        self.status.map_or(true, |s| trip.status == s)
            && self.vehicle_id.map_or(true, |id| trip.vehicle_id == id)
            && self.driver_id.map_or(true, |id| trip.driver_id == id)
    }
}
