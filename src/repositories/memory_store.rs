//! Backend en memoria de `FleetStore`
//!
//! Se usa cuando no hay `DATABASE_URL` configurada y en los tests. Todas las
//! tablas viven detrás de un único `RwLock`, así que `commit` valida cada
//! guarda y aplica las escrituras sin que otra petición se intercale.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChangeSet, FleetStore, Write};
use crate::models::{
    driver::{Driver, DriverFilters},
    fuel::{FuelFilters, FuelLog},
    maintenance::{MaintenanceFilters, MaintenanceLog},
    trip::{Trip, TripFilters},
    user::User,
    vehicle::{Vehicle, VehicleFilters},
};
use crate::utils::errors::{not_found_error, AppResult, StateConflict};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    vehicles: Vec<Vehicle>,
    drivers: Vec<Driver>,
    trips: Vec<Trip>,
    maintenance: Vec<MaintenanceLog>,
    fuel_logs: Vec<FuelLog>,
}

impl Tables {
    fn check(&self, write: &Write) -> Result<(), StateConflict> {
        match write {
            Write::InsertTrip(trip) => {
                if self.trips.iter().any(|t| t.id == trip.id) {
                    return Err(StateConflict::Duplicate {
                        entity: "Trip",
                        field: "id",
                        value: trip.id.to_string(),
                    });
                }
            }
            Write::InsertMaintenance(log) => {
                if self.maintenance.iter().any(|m| m.id == log.id) {
                    return Err(StateConflict::Duplicate {
                        entity: "MaintenanceLog",
                        field: "id",
                        value: log.id.to_string(),
                    });
                }
            }
            Write::UpdateTrip { trip, expected } => {
                let current = self.trips.iter().find(|t| t.id == trip.id);
                if current.map(|t| t.status) != Some(*expected) {
                    return Err(StateConflict::StaleWrite { entity: "Trip", id: trip.id });
                }
            }
            Write::UpdateVehicle { vehicle, expected } => {
                let current = self.vehicles.iter().find(|v| v.id == vehicle.id);
                if current.map(|v| v.status) != Some(*expected) {
                    return Err(StateConflict::StaleWrite { entity: "Vehicle", id: vehicle.id });
                }
            }
            Write::UpdateDriver { driver, expected } => {
                let current = self.drivers.iter().find(|d| d.id == driver.id);
                if current.map(|d| d.status) != Some(*expected) {
                    return Err(StateConflict::StaleWrite { entity: "Driver", id: driver.id });
                }
                if let Some(number) = &driver.license_number {
                    let taken = self
                        .drivers
                        .iter()
                        .any(|d| d.id != driver.id && d.license_number.as_ref() == Some(number));
                    if taken {
                        return Err(StateConflict::Duplicate {
                            entity: "Driver",
                            field: "license_number",
                            value: number.clone(),
                        });
                    }
                }
            }
            Write::UpdateMaintenance { log, expected_resolved } => {
                let current = self.maintenance.iter().find(|m| m.id == log.id);
                if current.map(|m| m.resolved) != Some(*expected_resolved) {
                    return Err(StateConflict::StaleWrite {
                        entity: "MaintenanceLog",
                        id: log.id,
                    });
                }
            }
            Write::ExpectOpenMaintenance { vehicle_id, open } => {
                let current = self
                    .maintenance
                    .iter()
                    .filter(|m| m.vehicle_id == *vehicle_id && !m.resolved)
                    .count();
                if current != *open {
                    return Err(StateConflict::StaleWrite {
                        entity: "Vehicle",
                        id: *vehicle_id,
                    });
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, write: Write) {
        match write {
            Write::InsertTrip(trip) => self.trips.push(trip),
            Write::InsertMaintenance(log) => self.maintenance.push(log),
            Write::UpdateTrip { trip, .. } => replace(&mut self.trips, trip, |t| t.id),
            Write::UpdateVehicle { vehicle, .. } => replace(&mut self.vehicles, vehicle, |v| v.id),
            Write::UpdateDriver { driver, .. } => replace(&mut self.drivers, driver, |d| d.id),
            Write::UpdateMaintenance { log, .. } => replace(&mut self.maintenance, log, |m| m.id),
            Write::ExpectOpenMaintenance { .. } => {}
        }
    }
}

fn replace<T>(rows: &mut [T], row: T, id: impl Fn(&T) -> Uuid) {
    let key = id(&row);
    if let Some(slot) = rows.iter_mut().find(|r| id(&**r) == key) {
        *slot = row;
    }
}

#[derive(Debug, Default)]
pub struct MemoryFleetStore {
    tables: RwLock<Tables>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StateConflict::Duplicate {
                entity: "User",
                field: "email",
                value: user.email.clone(),
            }
            .into());
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.vehicles.iter().any(|v| v.plate == vehicle.plate) {
            return Err(StateConflict::Duplicate {
                entity: "Vehicle",
                field: "plate",
                value: vehicle.plate.clone(),
            }
            .into());
        }
        tables.vehicles.push(vehicle.clone());
        Ok(())
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let tables = self.tables.read().await;
        Ok(tables.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        Ok(tables.vehicles.iter().filter(|v| filters.matches(v)).cloned().collect())
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.vehicles.iter().any(|v| v.id == id) {
            return Err(not_found_error("Vehicle", id));
        }
        let referenced = tables.trips.iter().any(|t| t.vehicle_id == id)
            || tables.maintenance.iter().any(|m| m.vehicle_id == id)
            || tables.fuel_logs.iter().any(|f| f.vehicle_id == id);
        if referenced {
            return Err(StateConflict::Referenced { entity: "Vehicle", id }.into());
        }
        tables.vehicles.retain(|v| v.id != id);
        Ok(())
    }

    async fn insert_driver(&self, driver: &Driver) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(number) = &driver.license_number {
            if tables
                .drivers
                .iter()
                .any(|d| d.license_number.as_ref() == Some(number))
            {
                return Err(StateConflict::Duplicate {
                    entity: "Driver",
                    field: "license_number",
                    value: number.clone(),
                }
                .into());
            }
        }
        tables.drivers.push(driver.clone());
        Ok(())
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.iter().find(|d| d.id == id).cloned())
    }

    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.iter().filter(|d| filters.matches(d)).cloned().collect())
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.drivers.iter().any(|d| d.id == id) {
            return Err(not_found_error("Driver", id));
        }
        if tables.trips.iter().any(|t| t.driver_id == id) {
            return Err(StateConflict::Referenced { entity: "Driver", id }.into());
        }
        tables.drivers.retain(|d| d.id != id);
        Ok(())
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let tables = self.tables.read().await;
        Ok(tables.trips.iter().find(|t| t.id == id).cloned())
    }

    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let tables = self.tables.read().await;
        Ok(tables.trips.iter().filter(|t| filters.matches(t)).cloned().collect())
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let tables = self.tables.read().await;
        Ok(tables.maintenance.iter().find(|m| m.id == id).cloned())
    }

    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        let tables = self.tables.read().await;
        Ok(tables.maintenance.iter().filter(|m| filters.matches(m)).cloned().collect())
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.fuel_logs.push(log.clone());
        Ok(())
    }

    async fn list_fuel_logs(&self, filters: &FuelFilters) -> AppResult<Vec<FuelLog>> {
        let tables = self.tables.read().await;
        Ok(tables.fuel_logs.iter().filter(|f| filters.matches(f)).cloned().collect())
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        for write in &changes.writes {
            tables.check(write)?;
        }
        for write in changes.writes {
            tables.apply(write);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::VehicleStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn vehicle(plate: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: None,
            model: None,
            plate: plate.to_string(),
            vehicle_type: Some("Van".to_string()),
            capacity: 500.0,
            odometer: 0.0,
            region: Some("North".to_string()),
            status: VehicleStatus::Available,
            acquisition_cost: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_plate_is_a_conflict() {
        let store = MemoryFleetStore::new();
        store.insert_vehicle(&vehicle("AB-123")).await.unwrap();
        let err = store.insert_vehicle(&vehicle("AB-123")).await.unwrap_err();
        assert!(matches!(
            err,
            crate::utils::errors::AppError::Conflict(StateConflict::Duplicate { field: "plate", .. })
        ));
    }

    #[tokio::test]
    async fn stale_guard_rejects_whole_change_set() {
        let store = MemoryFleetStore::new();
        let a = vehicle("A-1");
        let b = vehicle("B-2");
        store.insert_vehicle(&a).await.unwrap();
        store.insert_vehicle(&b).await.unwrap();

        let mut a2 = a.clone();
        a2.status = VehicleStatus::OnTrip;
        let mut b2 = b.clone();
        b2.status = VehicleStatus::OnTrip;

        // b no está en in_shop, así que el lote completo se descarta
        let changes = ChangeSet::new()
            .update_vehicle(a2, VehicleStatus::Available)
            .update_vehicle(b2, VehicleStatus::InShop);
        assert!(store.commit(changes).await.is_err());

        let a_now = store.find_vehicle(a.id).await.unwrap().unwrap();
        assert_eq!(a_now.status, VehicleStatus::Available);
    }

    #[tokio::test]
    async fn open_maintenance_guard_counts_unresolved_logs() {
        use crate::models::maintenance::MaintenanceLog;

        let store = MemoryFleetStore::new();
        let v = vehicle("M-1");
        store.insert_vehicle(&v).await.unwrap();
        let log = MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle_id: v.id,
            service_type: None,
            description: None,
            cost: Decimal::ZERO,
            date: Utc::now().date_naive(),
            resolved: false,
            created_at: Utc::now(),
        };
        store
            .commit(ChangeSet::new().insert_maintenance(log.clone()))
            .await
            .unwrap();

        let mut resolved = log.clone();
        resolved.resolved = true;
        let stale = ChangeSet::new()
            .expect_open_maintenance(v.id, 0)
            .update_maintenance(resolved.clone(), false);
        let err = store.commit(stale).await.unwrap_err();
        assert!(matches!(
            err,
            crate::utils::errors::AppError::Conflict(StateConflict::StaleWrite { entity: "Vehicle", .. })
        ));
        assert!(!store.find_maintenance(log.id).await.unwrap().unwrap().resolved);

        let fresh = ChangeSet::new()
            .expect_open_maintenance(v.id, 1)
            .update_maintenance(resolved, false);
        store.commit(fresh).await.unwrap();
        assert!(store.find_maintenance(log.id).await.unwrap().unwrap().resolved);
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let store = MemoryFleetStore::new();
        let mut truck = vehicle("T-1");
        truck.vehicle_type = Some("Truck".to_string());
        store.insert_vehicle(&truck).await.unwrap();
        store.insert_vehicle(&vehicle("V-1")).await.unwrap();

        let filters = VehicleFilters {
            vehicle_type: Some("Truck".to_string()),
            ..VehicleFilters::default()
        };
        let found = store.list_vehicles(&filters).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].plate, "T-1");
    }
}
