//! Servicios de negocio
//!
//! Ciclo de vida de viajes, acoplamiento de mantenimiento, agregación de
//! analytics y autenticación.

pub mod analytics_service;
pub mod auth_service;
pub mod maintenance_service;
pub mod trip_service;
pub mod trip_state_machine;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use maintenance_service::MaintenanceService;
pub use trip_service::TripService;
