//! Servicio de mantenimiento
//!
//! Abrir un registro manda el vehículo al taller; cerrarlo lo devuelve a
//! `available` cuando ya no quedan registros abiertos. Ambas operaciones
//! guardan lo observado en el lote, de modo que una apertura y un cierre
//! concurrentes sobre el mismo vehículo no pueden aplicarse los dos.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::dto::maintenance_dto::{CreateMaintenanceRequest, ResolveMaintenanceResponse};
use crate::models::{
    maintenance::{MaintenanceFilters, MaintenanceLog},
    vehicle::{Vehicle, VehicleStatus},
};
use crate::repositories::{ChangeSet, FleetStore};
use crate::utils::errors::{not_found_error, AppResult, StateConflict};
use crate::utils::rounding::money;

pub struct MaintenanceService {
    store: Arc<dyn FleetStore>,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Abrir un registro de mantenimiento
    pub async fn open(&self, request: CreateMaintenanceRequest, now: DateTime<Utc>) -> AppResult<MaintenanceLog> {
        let (changes, log, vehicle) = self.plan_open(request, now).await?;
        self.store.commit(changes).await?;

        info!(
            "🔧 Mantenimiento {} abierto para vehículo {} (estado: {})",
            log.id, vehicle.plate, vehicle.status
        );
        Ok(log)
    }

    /// Cerrar un registro de mantenimiento
    pub async fn resolve(&self, id: Uuid) -> AppResult<ResolveMaintenanceResponse> {
        let (changes, response) = self.plan_resolve(id).await?;
        self.store.commit(changes).await?;

        info!(
            "✅ Mantenimiento {} cerrado, vehículo {} en {} ({} abiertos)",
            response.log.id, response.vehicle.plate, response.vehicle.status, response.open_logs_remaining
        );
        Ok(response)
    }

    /// La fila del vehículo se escribe siempre, aunque su estado no cambie,
    /// para que un cierre concurrente invalide la guarda.
    async fn plan_open(
        &self,
        request: CreateMaintenanceRequest,
        now: DateTime<Utc>,
    ) -> AppResult<(ChangeSet, MaintenanceLog, Vehicle)> {
        let mut vehicle = self
            .store
            .find_vehicle(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", request.vehicle_id))?;

        if vehicle.status == VehicleStatus::OnTrip {
            return Err(StateConflict::VehicleUnavailable {
                vehicle_id: vehicle.id,
                status: vehicle.status,
            }
            .into());
        }

        let log = MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            service_type: request.service_type,
            description: request.description,
            cost: money(request.cost.unwrap_or(Decimal::ZERO)),
            date: request.date.unwrap_or_else(|| now.date_naive()),
            resolved: false,
            created_at: now,
        };

        let before = vehicle.status;
        if before == VehicleStatus::Available {
            vehicle.status = VehicleStatus::InShop;
        }
        let changes = ChangeSet::new()
            .update_vehicle(vehicle.clone(), before)
            .insert_maintenance(log.clone());
        Ok((changes, log, vehicle))
    }

    /// El conteo de registros abiertos viaja como guarda en el lote
    async fn plan_resolve(&self, id: Uuid) -> AppResult<(ChangeSet, ResolveMaintenanceResponse)> {
        let mut log = self
            .store
            .find_maintenance(id)
            .await?
            .ok_or_else(|| not_found_error("MaintenanceLog", id))?;

        if log.resolved {
            return Err(StateConflict::MaintenanceResolved { log_id: id }.into());
        }

        let mut vehicle = self
            .store
            .find_vehicle(log.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", log.vehicle_id))?;

        let open_logs = self
            .store
            .list_maintenance(&MaintenanceFilters::open_for_vehicle(vehicle.id))
            .await?
            .len();
        let open_logs_remaining = open_logs.saturating_sub(1);

        log.resolved = true;
        let mut changes = ChangeSet::new()
            .expect_open_maintenance(vehicle.id, open_logs)
            .update_maintenance(log.clone(), false);
        if vehicle.status == VehicleStatus::InShop && open_logs_remaining == 0 {
            vehicle.status = VehicleStatus::Available;
            changes = changes.update_vehicle(vehicle.clone(), VehicleStatus::InShop);
        }

        let response = ResolveMaintenanceResponse {
            log,
            vehicle,
            open_logs_remaining,
        };
        Ok((changes, response))
    }

    pub async fn list(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        self.store.list_maintenance(filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryFleetStore;
    use crate::utils::errors::AppError;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
    }

    fn vehicle(status: VehicleStatus) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: None,
            model: None,
            plate: "VAN-01".to_string(),
            vehicle_type: Some("Van".to_string()),
            capacity: 800.0,
            odometer: 12_000.0,
            region: None,
            status,
            acquisition_cost: Decimal::ZERO,
            created_at: now(),
        }
    }

    fn request(vehicle_id: Uuid) -> CreateMaintenanceRequest {
        CreateMaintenanceRequest {
            vehicle_id,
            service_type: Some("Oil change".to_string()),
            description: None,
            cost: Some(Decimal::new(12_050, 2)),
            date: None,
        }
    }

    async fn setup(status: VehicleStatus) -> (MaintenanceService, Arc<MemoryFleetStore>, Vehicle) {
        let store = Arc::new(MemoryFleetStore::new());
        let vehicle = vehicle(status);
        store.insert_vehicle(&vehicle).await.unwrap();
        (MaintenanceService::new(store.clone()), store, vehicle)
    }

    async fn status_of(store: &MemoryFleetStore, id: Uuid) -> VehicleStatus {
        store.find_vehicle(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn opening_sends_vehicle_to_shop_and_defaults_date() {
        let (service, store, vehicle) = setup(VehicleStatus::Available).await;

        let log = service.open(request(vehicle.id), now()).await.unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert!(!log.resolved);
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::InShop);
    }

    #[tokio::test]
    async fn opening_on_vehicle_mid_trip_is_a_conflict() {
        let (service, store, vehicle) = setup(VehicleStatus::OnTrip).await;

        let err = service.open(request(vehicle.id), now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict(StateConflict::VehicleUnavailable { status: VehicleStatus::OnTrip, .. })
        ));
        assert!(service.list(&MaintenanceFilters::default()).await.unwrap().is_empty());
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::OnTrip);
    }

    #[tokio::test]
    async fn retired_vehicle_stays_retired() {
        let (service, store, vehicle) = setup(VehicleStatus::Retired).await;

        let log = service.open(request(vehicle.id), now()).await.unwrap();
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Retired);

        service.resolve(log.id).await.unwrap();
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Retired);
    }

    #[tokio::test]
    async fn vehicle_returns_only_after_last_open_log() {
        let (service, store, vehicle) = setup(VehicleStatus::Available).await;
        let first = service.open(request(vehicle.id), now()).await.unwrap();
        let second = service.open(request(vehicle.id), now()).await.unwrap();

        let response = service.resolve(first.id).await.unwrap();
        assert_eq!(response.open_logs_remaining, 1);
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::InShop);

        let response = service.resolve(second.id).await.unwrap();
        assert_eq!(response.open_logs_remaining, 0);
        assert_eq!(response.vehicle.status, VehicleStatus::Available);
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn log_opened_during_resolve_keeps_vehicle_in_shop() {
        let (service, store, vehicle) = setup(VehicleStatus::Available).await;
        let first = service.open(request(vehicle.id), now()).await.unwrap();

        // el cierre ve un único registro abierto
        let (pending_resolve, _) = service.plan_resolve(first.id).await.unwrap();
        let second = service.open(request(vehicle.id), now()).await.unwrap();

        let err = store.commit(pending_resolve).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(StateConflict::StaleWrite { .. })));
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::InShop);
        assert!(!store.find_maintenance(first.id).await.unwrap().unwrap().resolved);

        // reintentar ve los dos registros
        let response = service.resolve(first.id).await.unwrap();
        assert_eq!(response.open_logs_remaining, 1);
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::InShop);
        service.resolve(second.id).await.unwrap();
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn log_opened_against_stale_in_shop_status_is_rejected() {
        let (service, store, vehicle) = setup(VehicleStatus::Available).await;
        let first = service.open(request(vehicle.id), now()).await.unwrap();

        // la apertura ve el vehículo en taller
        let (pending_open, late_log, _) = service.plan_open(request(vehicle.id), now()).await.unwrap();
        service.resolve(first.id).await.unwrap();
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Available);

        let err = store.commit(pending_open).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(StateConflict::StaleWrite { .. })));
        assert!(store.find_maintenance(late_log.id).await.unwrap().is_none());
        assert_eq!(status_of(&store, vehicle.id).await, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn resolving_twice_is_a_conflict() {
        let (service, _, vehicle) = setup(VehicleStatus::Available).await;
        let log = service.open(request(vehicle.id), now()).await.unwrap();

        service.resolve(log.id).await.unwrap();
        let err = service.resolve(log.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict(StateConflict::MaintenanceResolved { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_vehicle_is_not_found() {
        let (service, _, _) = setup(VehicleStatus::Available).await;
        let err = service.open(request(Uuid::new_v4()), now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
