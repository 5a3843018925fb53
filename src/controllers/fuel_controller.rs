use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::fuel_dto::CreateFuelLogRequest;
use crate::models::fuel::{FuelFilters, FuelLog};
use crate::repositories::FleetStore;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::rounding::money;

pub struct FuelController {
    store: Arc<dyn FleetStore>,
}

impl FuelController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateFuelLogRequest,
        now: DateTime<Utc>,
    ) -> Result<ApiResponse<FuelLog>, AppError> {
        let vehicle = self
            .store
            .find_vehicle(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.vehicle_id))?;

        if let Some(trip_id) = request.trip_id {
            let trip = self
                .store
                .find_trip(trip_id)
                .await?
                .ok_or_else(|| not_found_error("Trip", trip_id))?;
            if trip.vehicle_id != vehicle.id {
                return Err(AppError::BadRequest(format!(
                    "Trip {} does not belong to vehicle {}",
                    trip_id, vehicle.id
                )));
            }
        }

        let log = FuelLog {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            trip_id: request.trip_id,
            liters: request.liters,
            cost: money(request.cost),
            misc_expense: money(request.misc_expense.unwrap_or(Decimal::ZERO)),
            distance_km: request.distance_km.unwrap_or(0.0),
            odometer_at_fill: request.odometer_at_fill,
            date: request.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
        };

        self.store.insert_fuel_log(&log).await?;
        info!("⛽ Carga registrada: {}L / {} para {}", log.liters, log.cost, vehicle.plate);

        Ok(ApiResponse::success_with_message(
            log,
            "Fuel log recorded".to_string(),
        ))
    }

    pub async fn list(&self, filters: &FuelFilters) -> Result<Vec<FuelLog>, AppError> {
        self.store.list_fuel_logs(filters).await
    }
}
