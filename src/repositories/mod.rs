//! Repositorios
//!
//! `FleetStore` es el contrato de persistencia que consumen los servicios.
//! Las lecturas son directas; todas las mutaciones multi-entidad pasan por
//! `commit`, que aplica un `ChangeSet` completo o nada.
//!
//! Cada escritura de actualización lleva el estado que observó quien la
//! construyó. Si al confirmar la fila ya no tiene ese estado, el backend
//! rechaza todo el lote con `StateConflict::StaleWrite`.

pub mod memory_store;
pub mod pg_store;

pub use memory_store::MemoryFleetStore;
pub use pg_store::PgFleetStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    driver::{Driver, DriverFilters, DriverStatus},
    fuel::{FuelFilters, FuelLog},
    maintenance::{MaintenanceFilters, MaintenanceLog},
    trip::{Trip, TripFilters, TripStatus},
    user::User,
    vehicle::{Vehicle, VehicleFilters, VehicleStatus},
};
use crate::utils::errors::AppResult;

/// Una escritura dentro de un `ChangeSet`
#[derive(Debug, Clone)]
pub enum Write {
    InsertTrip(Trip),
    UpdateTrip { trip: Trip, expected: TripStatus },
    UpdateVehicle { vehicle: Vehicle, expected: VehicleStatus },
    UpdateDriver { driver: Driver, expected: DriverStatus },
    InsertMaintenance(MaintenanceLog),
    UpdateMaintenance { log: MaintenanceLog, expected_resolved: bool },
    /// Solo guarda: el vehículo debe tener exactamente `open` registros sin
    /// resolver. Bloquea la fila del vehículo hasta el final del commit.
    ExpectOpenMaintenance { vehicle_id: Uuid, open: usize },
}

/// Unidad de trabajo atómica
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub writes: Vec<Write>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_trip(mut self, trip: Trip) -> Self {
        self.writes.push(Write::InsertTrip(trip));
        self
    }

    pub fn update_trip(mut self, trip: Trip, expected: TripStatus) -> Self {
        self.writes.push(Write::UpdateTrip { trip, expected });
        self
    }

    pub fn update_vehicle(mut self, vehicle: Vehicle, expected: VehicleStatus) -> Self {
        self.writes.push(Write::UpdateVehicle { vehicle, expected });
        self
    }

    pub fn update_driver(mut self, driver: Driver, expected: DriverStatus) -> Self {
        self.writes.push(Write::UpdateDriver { driver, expected });
        self
    }

    pub fn insert_maintenance(mut self, log: MaintenanceLog) -> Self {
        self.writes.push(Write::InsertMaintenance(log));
        self
    }

    pub fn update_maintenance(mut self, log: MaintenanceLog, expected_resolved: bool) -> Self {
        self.writes.push(Write::UpdateMaintenance { log, expected_resolved });
        self
    }

    /// Debe ir antes que las escrituras que cambian registros de ese vehículo
    pub fn expect_open_maintenance(mut self, vehicle_id: Uuid, open: usize) -> Self {
        self.writes.push(Write::ExpectOpenMaintenance { vehicle_id, open });
        self
    }
}

#[async_trait]
pub trait FleetStore: Send + Sync + 'static {
    // ── Users ────────────────────────────────────────────────────────────────
    async fn insert_user(&self, user: &User) -> AppResult<()>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    // ── Vehicles ─────────────────────────────────────────────────────────────
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()>;
    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>>;
    /// Falla con `Referenced` si algún viaje o registro apunta al vehículo
    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()>;

    // ── Drivers ──────────────────────────────────────────────────────────────
    async fn insert_driver(&self, driver: &Driver) -> AppResult<()>;
    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;
    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>>;
    async fn delete_driver(&self, id: Uuid) -> AppResult<()>;

    // ── Trips ────────────────────────────────────────────────────────────────
    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>>;
    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>>;

    // ── Maintenance ──────────────────────────────────────────────────────────
    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>>;
    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>>;

    // ── Fuel ─────────────────────────────────────────────────────────────────
    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<()>;
    async fn list_fuel_logs(&self, filters: &FuelFilters) -> AppResult<Vec<FuelLog>>;

    /// Aplica todas las escrituras en una sola transacción
    async fn commit(&self, changes: ChangeSet) -> AppResult<()>;
}
