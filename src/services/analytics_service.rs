//! Servicio de analytics
//!
//! Las agregaciones son funciones puras sobre slices de registros; el
//! servicio solo carga las tablas desde el store.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    analytics::{DriverReport, FleetDashboard, MonthlyFilters, MonthlyReport, VehicleReport},
    driver::{Driver, DriverFilters},
    fuel::{FuelFilters, FuelLog},
    maintenance::{MaintenanceFilters, MaintenanceLog},
    trip::{Trip, TripFilters, TripStatus},
    vehicle::{Vehicle, VehicleFilters, VehicleStatus},
};
use crate::repositories::FleetStore;
use crate::utils::errors::AppResult;
use crate::utils::rounding::{decimal_percentage, money, money_sum, per_unit, percentage, round_f64};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Métricas de costo y rendimiento de un vehículo
pub fn vehicle_report(
    vehicle: &Vehicle,
    trips: &[Trip],
    fuel_logs: &[FuelLog],
    maintenance: &[MaintenanceLog],
) -> VehicleReport {
    let completed: Vec<&Trip> = trips
        .iter()
        .filter(|t| t.vehicle_id == vehicle.id && t.status == TripStatus::Completed)
        .collect();
    let fuel: Vec<&FuelLog> = fuel_logs.iter().filter(|f| f.vehicle_id == vehicle.id).collect();

    let total_fuel_cost = money_sum(fuel.iter().map(|f| f.cost));
    let total_liters: f64 = fuel.iter().map(|f| f.liters).sum();
    let total_maintenance_cost = money_sum(
        maintenance
            .iter()
            .filter(|m| m.vehicle_id == vehicle.id)
            .map(|m| m.cost),
    );
    let total_revenue = money_sum(completed.iter().map(|t| t.revenue));
    let total_km: f64 = completed.iter().map(|t| t.distance_km()).sum();

    let total_operational_cost = total_fuel_cost.saturating_add(total_maintenance_cost);

    let fuel_efficiency_km_per_l = if total_liters > 0.0 {
        round_f64(total_km / total_liters, 2)
    } else {
        0.0
    };

    let cost_per_km = per_unit(total_operational_cost, total_km);
    let roi_percent = decimal_percentage(
        total_revenue.saturating_sub(total_operational_cost),
        vehicle.acquisition_cost,
    );

    VehicleReport {
        vehicle_id: vehicle.id,
        plate: vehicle.plate.clone(),
        name: vehicle.name.clone(),
        total_trips: completed.len(),
        total_km: round_f64(total_km, 2),
        total_liters: round_f64(total_liters, 2),
        total_fuel_cost: money(total_fuel_cost),
        total_maintenance_cost: money(total_maintenance_cost),
        total_operational_cost: money(total_operational_cost),
        total_revenue: money(total_revenue),
        fuel_efficiency_km_per_l,
        cost_per_km,
        roi_percent,
    }
}

/// Desempeño de un conductor
pub fn driver_report(driver: &Driver, trips: &[Trip], today: NaiveDate) -> DriverReport {
    let own: Vec<&Trip> = trips.iter().filter(|t| t.driver_id == driver.id).collect();
    let completed_trips = own.iter().filter(|t| t.status == TripStatus::Completed).count();

    DriverReport {
        driver_id: driver.id,
        name: driver.name.clone(),
        status: driver.status,
        safety_score: driver.safety_score,
        license_valid: driver.is_license_valid(today),
        license_expiry: driver.license_expiry,
        total_trips: own.len(),
        completed_trips,
        completion_rate: percentage(completed_trips, own.len()),
    }
}

/// Ingresos y gastos por mes
///
/// Sin `year` todos los años se acumulan en los mismos 12 meses. Los
/// ingresos se imputan al mes de `completed_at`; combustible y
/// mantenimiento al mes de su `date`.
pub fn monthly_report(
    trips: &[Trip],
    fuel_logs: &[FuelLog],
    maintenance: &[MaintenanceLog],
    year: Option<i32>,
) -> Vec<MonthlyReport> {
    let in_year = |y: i32| year.map_or(true, |wanted| wanted == y);

    let mut revenue = [Decimal::ZERO; 12];
    let mut fuel_cost = [Decimal::ZERO; 12];
    let mut maintenance_cost = [Decimal::ZERO; 12];

    for trip in trips.iter().filter(|t| t.status == TripStatus::Completed) {
        if let Some(at) = trip.completed_at {
            if in_year(at.year()) {
                let month = at.month0() as usize;
                revenue[month] = revenue[month].saturating_add(trip.revenue);
            }
        }
    }
    for log in fuel_logs.iter().filter(|f| in_year(f.date.year())) {
        let month = log.date.month0() as usize;
        fuel_cost[month] = fuel_cost[month].saturating_add(log.cost);
    }
    for log in maintenance.iter().filter(|m| in_year(m.date.year())) {
        let month = log.date.month0() as usize;
        maintenance_cost[month] = maintenance_cost[month].saturating_add(log.cost);
    }

    MONTHS
        .iter()
        .enumerate()
        .map(|(i, label)| MonthlyReport {
            month: label.to_string(),
            month_number: i as u32 + 1,
            year,
            revenue: money(revenue[i]),
            fuel_cost: money(fuel_cost[i]),
            maintenance_cost: money(maintenance_cost[i]),
            net_profit: money(
                revenue[i]
                    .saturating_sub(fuel_cost[i])
                    .saturating_sub(maintenance_cost[i]),
            ),
        })
        .collect()
}

/// Resumen del estado de la flota
pub fn fleet_dashboard(vehicles: &[Vehicle], trips: &[Trip]) -> FleetDashboard {
    let count = |status: VehicleStatus| vehicles.iter().filter(|v| v.status == status).count();
    let active_fleet = count(VehicleStatus::OnTrip);

    FleetDashboard {
        total: vehicles.len(),
        active_fleet,
        in_shop: count(VehicleStatus::InShop),
        idle: count(VehicleStatus::Available),
        retired: count(VehicleStatus::Retired),
        utilization_rate: percentage(active_fleet, vehicles.len()),
        pending_cargo: trips.iter().filter(|t| t.status == TripStatus::Draft).count(),
    }
}

pub struct AnalyticsService {
    store: Arc<dyn FleetStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn vehicle_reports(&self) -> AppResult<Vec<VehicleReport>> {
        let vehicles = self.store.list_vehicles(&VehicleFilters::default()).await?;
        let trips = self.completed_trips().await?;
        let fuel_logs = self.store.list_fuel_logs(&FuelFilters::default()).await?;
        let maintenance = self.store.list_maintenance(&MaintenanceFilters::default()).await?;

        debug!("📊 Reporte de {} vehículos", vehicles.len());
        Ok(vehicles
            .iter()
            .map(|v| vehicle_report(v, &trips, &fuel_logs, &maintenance))
            .collect())
    }

    pub async fn driver_reports(&self, today: NaiveDate) -> AppResult<Vec<DriverReport>> {
        let drivers = self.store.list_drivers(&DriverFilters::default()).await?;
        let trips = self.store.list_trips(&TripFilters::default()).await?;

        debug!("📊 Reporte de {} conductores", drivers.len());
        Ok(drivers.iter().map(|d| driver_report(d, &trips, today)).collect())
    }

    pub async fn monthly(&self, filters: &MonthlyFilters) -> AppResult<Vec<MonthlyReport>> {
        let trips = self.completed_trips().await?;
        let fuel_logs = self.store.list_fuel_logs(&FuelFilters::default()).await?;
        let maintenance = self.store.list_maintenance(&MaintenanceFilters::default()).await?;

        Ok(monthly_report(&trips, &fuel_logs, &maintenance, filters.year))
    }

    pub async fn dashboard(&self) -> AppResult<FleetDashboard> {
        let vehicles = self.store.list_vehicles(&VehicleFilters::default()).await?;
        let drafts = self
            .store
            .list_trips(&TripFilters {
                status: Some(TripStatus::Draft),
                ..TripFilters::default()
            })
            .await?;

        Ok(fleet_dashboard(&vehicles, &drafts))
    }

    async fn completed_trips(&self) -> AppResult<Vec<Trip>> {
        self.store
            .list_trips(&TripFilters {
                status: Some(TripStatus::Completed),
                ..TripFilters::default()
            })
            .await
    }
}
