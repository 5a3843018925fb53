use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::Trip;
use crate::utils::validation::validate_amount;

// Request para crear un viaje
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub cargo_weight: f64,
    #[validate(length(max = 200))]
    pub origin: Option<String>,
    #[validate(length(max = 200))]
    pub destination: Option<String>,
    #[validate(custom = "validate_amount")]
    pub estimated_fuel_cost: Option<Decimal>,
    #[validate(custom = "validate_amount")]
    pub revenue: Option<Decimal>,
}

// Request de transición de estado (`PUT /trips/{id}`)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitionTripRequest {
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(range(min = 0.0, max = 10000000.0))]
    pub end_odometer: Option<f64>,
}

// Response de viaje con la distancia derivada
#[derive(Debug, Serialize)]
pub struct TripResponse {
    #[serde(flatten)]
    pub trip: Trip,
    pub distance_km: f64,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        let distance_km = trip.distance_km();
        Self { trip, distance_km }
    }
}
