//! Modelos de Analytics
//!
//! Este módulo contiene las filas de los reportes derivados: rendimiento
//! por vehículo, por conductor, resumen mensual y dashboard de flota.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::driver::DriverStatus;

/// Métricas de costo y rendimiento por vehículo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleReport {
    pub vehicle_id: Uuid,
    pub plate: String,
    pub name: Option<String>,
    pub total_trips: usize,
    pub total_km: f64,
    pub total_liters: f64,

    // Métricas de costos
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub total_operational_cost: Decimal,
    pub total_revenue: Decimal,

    // Métricas de eficiencia
    pub fuel_efficiency_km_per_l: f64,
    pub cost_per_km: Decimal,
    pub roi_percent: Decimal,
}

/// Desempeño por conductor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverReport {
    pub driver_id: Uuid,
    pub name: String,
    pub status: DriverStatus,
    pub safety_score: f64,
    pub license_valid: bool,
    pub license_expiry: Option<NaiveDate>,
    pub total_trips: usize,
    pub completed_trips: usize,
    pub completion_rate: f64,
}

/// Fila mensual de ingresos y gastos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub month: String,
    pub month_number: u32,
    pub year: Option<i32>,
    pub revenue: Decimal,
    pub fuel_cost: Decimal,
    pub maintenance_cost: Decimal,
    pub net_profit: Decimal,
}

/// Resumen para dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetDashboard {
    pub total: usize,
    pub active_fleet: usize,
    pub in_shop: usize,
    pub idle: usize,
    pub retired: usize,
    pub utilization_rate: f64,
    pub pending_cargo: usize,
}

/// Filtros para el reporte mensual
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyFilters {
    pub year: Option<i32>,
}
