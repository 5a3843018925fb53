//! Backend PostgreSQL de `FleetStore`
//!
//! Las lecturas usan `query_as` en tiempo de ejecución; `commit` abre una
//! transacción y cada UPDATE lleva la guarda de estado en el WHERE.

use async_trait::async_trait;
use sqlx::{postgres::PgQueryResult, PgPool, Postgres, QueryBuilder};
use tracing::debug;
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
use crate::utils::errors::{not_found_error, AppError, AppResult, StateConflict};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn db_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Traduce violaciones de unicidad a `Duplicate`
fn map_unique(e: sqlx::Error, entity: &'static str, field: &'static str, value: &str) -> AppError {
    if db_code(&e).as_deref() == Some(UNIQUE_VIOLATION) {
        StateConflict::Duplicate {
            entity,
            field,
            value: value.to_string(),
        }
        .into()
    } else {
        AppError::Database(e)
    }
}

/// Traduce violaciones de FK a `Referenced`
fn map_referenced(e: sqlx::Error, entity: &'static str, id: Uuid) -> AppError {
    if db_code(&e).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        StateConflict::Referenced { entity, id }.into()
    } else {
        AppError::Database(e)
    }
}

fn guard(result: PgQueryResult, entity: &'static str, id: Uuid) -> AppResult<()> {
    if result.rows_affected() == 0 {
        return Err(StateConflict::StaleWrite { entity, id }.into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn insert_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "User", "email", &user.email))?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, name, model, plate, vehicle_type, capacity, odometer, region, status, acquisition_cost, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.name)
        .bind(&vehicle.model)
        .bind(&vehicle.plate)
        .bind(&vehicle.vehicle_type)
        .bind(vehicle.capacity)
        .bind(vehicle.odometer)
        .bind(&vehicle.region)
        .bind(vehicle.status)
        .bind(vehicle.acquisition_cost)
        .bind(vehicle.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Vehicle", "plate", &vehicle.plate))?;

        Ok(())
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM vehicles WHERE 1 = 1");
        if let Some(vehicle_type) = &filters.vehicle_type {
            query.push(" AND vehicle_type = ").push_bind(vehicle_type.clone());
        }
        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(region) = &filters.region {
            query.push(" AND region = ").push_bind(region.clone());
        }
        query.push(" ORDER BY created_at");

        let vehicles = query
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_referenced(e, "Vehicle", id))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", id));
        }
        Ok(())
    }

    async fn insert_driver(&self, driver: &Driver) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drivers (id, name, license_number, license_expiry, license_category, status, safety_score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.license_number)
        .bind(driver.license_expiry)
        .bind(&driver.license_category)
        .bind(driver.status)
        .bind(driver.safety_score)
        .bind(driver.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let number = driver.license_number.as_deref().unwrap_or_default();
            map_unique(e, "Driver", "license_number", number)
        })?;

        Ok(())
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn list_drivers(&self, filters: &DriverFilters) -> AppResult<Vec<Driver>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM drivers WHERE 1 = 1");
        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at");

        let drivers = query.build_query_as::<Driver>().fetch_all(&self.pool).await?;
        Ok(drivers)
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_referenced(e, "Driver", id))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Driver", id));
        }
        Ok(())
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    async fn list_trips(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM trips WHERE 1 = 1");
        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(vehicle_id) = filters.vehicle_id {
            query.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(driver_id) = filters.driver_id {
            query.push(" AND driver_id = ").push_bind(driver_id);
        }
        query.push(" ORDER BY created_at");

        let trips = query.build_query_as::<Trip>().fetch_all(&self.pool).await?;
        Ok(trips)
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let log = sqlx::query_as::<_, MaintenanceLog>("SELECT * FROM maintenance_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(log)
    }

    async fn list_maintenance(&self, filters: &MaintenanceFilters) -> AppResult<Vec<MaintenanceLog>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM maintenance_logs WHERE 1 = 1");
        if let Some(vehicle_id) = filters.vehicle_id {
            query.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(resolved) = filters.resolved {
            query.push(" AND resolved = ").push_bind(resolved);
        }
        if let Some(from) = filters.date_from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filters.date_to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(" ORDER BY date, created_at");

        let logs = query
            .build_query_as::<MaintenanceLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    async fn insert_fuel_log(&self, log: &FuelLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fuel_logs (id, vehicle_id, trip_id, liters, cost, misc_expense, distance_km, odometer_at_fill, date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(log.id)
        .bind(log.vehicle_id)
        .bind(log.trip_id)
        .bind(log.liters)
        .bind(log.cost)
        .bind(log.misc_expense)
        .bind(log.distance_km)
        .bind(log.odometer_at_fill)
        .bind(log.date)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_fuel_logs(&self, filters: &FuelFilters) -> AppResult<Vec<FuelLog>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM fuel_logs WHERE 1 = 1");
        if let Some(vehicle_id) = filters.vehicle_id {
            query.push(" AND vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(trip_id) = filters.trip_id {
            query.push(" AND trip_id = ").push_bind(trip_id);
        }
        if let Some(from) = filters.date_from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filters.date_to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(" ORDER BY date, created_at");

        let logs = query.build_query_as::<FuelLog>().fetch_all(&self.pool).await?;
        Ok(logs)
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let count = changes.writes.len();

        // Si alguna guarda falla se retorna antes del commit y `tx` hace rollback al soltarse
        for write in changes.writes {
            match write {
                Write::InsertTrip(trip) => {
                    sqlx::query(
                        r#"
                        INSERT INTO trips (id, vehicle_id, driver_id, cargo_weight, origin, destination, status,
                                           start_odometer, end_odometer, estimated_fuel_cost, revenue, created_at, completed_at)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                        "#,
                    )
                    .bind(trip.id)
                    .bind(trip.vehicle_id)
                    .bind(trip.driver_id)
                    .bind(trip.cargo_weight)
                    .bind(&trip.origin)
                    .bind(&trip.destination)
                    .bind(trip.status)
                    .bind(trip.start_odometer)
                    .bind(trip.end_odometer)
                    .bind(trip.estimated_fuel_cost)
                    .bind(trip.revenue)
                    .bind(trip.created_at)
                    .bind(trip.completed_at)
                    .execute(&mut *tx)
                    .await?;
                }

                Write::UpdateTrip { trip, expected } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE trips
                        SET status = $2, start_odometer = $3, end_odometer = $4, completed_at = $5,
                            origin = $6, destination = $7, cargo_weight = $8,
                            estimated_fuel_cost = $9, revenue = $10
                        WHERE id = $1 AND status = $11
                        "#,
                    )
                    .bind(trip.id)
                    .bind(trip.status)
                    .bind(trip.start_odometer)
                    .bind(trip.end_odometer)
                    .bind(trip.completed_at)
                    .bind(&trip.origin)
                    .bind(&trip.destination)
                    .bind(trip.cargo_weight)
                    .bind(trip.estimated_fuel_cost)
                    .bind(trip.revenue)
                    .bind(expected)
                    .execute(&mut *tx)
                    .await?;
                    guard(result, "Trip", trip.id)?;
                }

                Write::UpdateVehicle { vehicle, expected } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE vehicles
                        SET name = $2, model = $3, plate = $4, vehicle_type = $5, capacity = $6,
                            odometer = $7, region = $8, status = $9, acquisition_cost = $10
                        WHERE id = $1 AND status = $11
                        "#,
                    )
                    .bind(vehicle.id)
                    .bind(&vehicle.name)
                    .bind(&vehicle.model)
                    .bind(&vehicle.plate)
                    .bind(&vehicle.vehicle_type)
                    .bind(vehicle.capacity)
                    .bind(vehicle.odometer)
                    .bind(&vehicle.region)
                    .bind(vehicle.status)
                    .bind(vehicle.acquisition_cost)
                    .bind(expected)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_unique(e, "Vehicle", "plate", &vehicle.plate))?;
                    guard(result, "Vehicle", vehicle.id)?;
                }

                Write::UpdateDriver { driver, expected } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE drivers
                        SET name = $2, license_number = $3, license_expiry = $4, license_category = $5,
                            status = $6, safety_score = $7
                        WHERE id = $1 AND status = $8
                        "#,
                    )
                    .bind(driver.id)
                    .bind(&driver.name)
                    .bind(&driver.license_number)
                    .bind(driver.license_expiry)
                    .bind(&driver.license_category)
                    .bind(driver.status)
                    .bind(driver.safety_score)
                    .bind(expected)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        let number = driver.license_number.as_deref().unwrap_or_default();
                        map_unique(e, "Driver", "license_number", number)
                    })?;
                    guard(result, "Driver", driver.id)?;
                }

                Write::InsertMaintenance(log) => {
                    sqlx::query(
                        r#"
                        INSERT INTO maintenance_logs (id, vehicle_id, service_type, description, cost, date, resolved, created_at)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                        "#,
                    )
                    .bind(log.id)
                    .bind(log.vehicle_id)
                    .bind(&log.service_type)
                    .bind(&log.description)
                    .bind(log.cost)
                    .bind(log.date)
                    .bind(log.resolved)
                    .bind(log.created_at)
                    .execute(&mut *tx)
                    .await?;
                }

                Write::UpdateMaintenance { log, expected_resolved } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE maintenance_logs
                        SET service_type = $2, description = $3, cost = $4, date = $5, resolved = $6
                        WHERE id = $1 AND resolved = $7
                        "#,
                    )
                    .bind(log.id)
                    .bind(&log.service_type)
                    .bind(&log.description)
                    .bind(log.cost)
                    .bind(log.date)
                    .bind(log.resolved)
                    .bind(expected_resolved)
                    .execute(&mut *tx)
                    .await?;
                    guard(result, "MaintenanceLog", log.id)?;
                }

                Write::ExpectOpenMaintenance { vehicle_id, open } => {
                    // El lock serializa con cualquier otra escritura sobre el vehículo
                    let locked: Option<Uuid> =
                        sqlx::query_scalar("SELECT id FROM vehicles WHERE id = $1 FOR UPDATE")
                            .bind(vehicle_id)
                            .fetch_optional(&mut *tx)
                            .await?;
                    if locked.is_none() {
                        return Err(StateConflict::StaleWrite { entity: "Vehicle", id: vehicle_id }.into());
                    }

                    let current: i64 = sqlx::query_scalar(
                        "SELECT COUNT(*) FROM maintenance_logs WHERE vehicle_id = $1 AND NOT resolved",
                    )
                    .bind(vehicle_id)
                    .fetch_one(&mut *tx)
                    .await?;
                    if current != open as i64 {
                        return Err(StateConflict::StaleWrite { entity: "Vehicle", id: vehicle_id }.into());
                    }
                }
            }
        }

        tx.commit().await?;
        debug!("💾 Transacción confirmada con {} escrituras", count);
        Ok(())
    }
}
