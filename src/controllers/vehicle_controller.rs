use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::vehicle::{Vehicle, VehicleFilters, VehicleStatus};
use crate::repositories::{ChangeSet, FleetStore};
use crate::utils::errors::{not_found_error, AppError, RuleViolation, StateConflict};
use crate::utils::rounding::money;

pub struct VehicleController {
    store: Arc<dyn FleetStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
        now: DateTime<Utc>,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        if request.capacity <= 0.0 {
            return Err(AppError::BadRequest("capacity must be greater than zero".to_string()));
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: request.name,
            model: request.model,
            plate: request.plate.trim().to_string(),
            vehicle_type: request.vehicle_type,
            capacity: request.capacity,
            odometer: request.odometer.unwrap_or(0.0),
            region: request.region,
            status: VehicleStatus::Available,
            acquisition_cost: money(request.acquisition_cost.unwrap_or(Decimal::ZERO)),
            created_at: now,
        };

        // Duplicados de matrícula los rechaza el store
        self.store.insert_vehicle(&vehicle).await?;
        info!("🚗 Vehículo creado: {} ({})", vehicle.plate, vehicle.id);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn list(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, AppError> {
        self.store.list_vehicles(filters).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        let mut vehicle = self.get_by_id(id).await?;
        let before = vehicle.status;

        if let Some(odometer) = request.odometer {
            // El odómetro nunca retrocede
            if odometer < vehicle.odometer {
                return Err(RuleViolation::OdometerRegression {
                    start_odometer: vehicle.odometer,
                    end_odometer: odometer,
                }
                .into());
            }
            vehicle.odometer = odometer;
        }

        if let Some(status) = request.status {
            if status != VehicleStatus::Retired {
                return Err(RuleViolation::FieldNotAllowed {
                    field: "status",
                    value: status.to_string(),
                }
                .into());
            }
            if before == VehicleStatus::OnTrip {
                return Err(StateConflict::VehicleUnavailable {
                    vehicle_id: vehicle.id,
                    status: before,
                }
                .into());
            }
            vehicle.status = VehicleStatus::Retired;
        }

        if let Some(name) = request.name {
            vehicle.name = Some(name);
        }
        if let Some(model) = request.model {
            vehicle.model = Some(model);
        }
        if let Some(vehicle_type) = request.vehicle_type {
            vehicle.vehicle_type = Some(vehicle_type);
        }
        if let Some(region) = request.region {
            vehicle.region = Some(region);
        }
        if let Some(cost) = request.acquisition_cost {
            vehicle.acquisition_cost = money(cost);
        }

        self.store
            .commit(ChangeSet::new().update_vehicle(vehicle.clone(), before))
            .await?;
        info!("🚗 Vehículo actualizado: {} (estado: {})", vehicle.plate, vehicle.status);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle updated".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_vehicle(id).await?;
        info!("🗑️ Vehículo eliminado: {}", id);
        Ok(())
    }
}
