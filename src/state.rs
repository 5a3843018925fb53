//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::FleetStore;
use crate::services::{AnalyticsService, AuthService, MaintenanceService, TripService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FleetStore>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, config: EnvironmentConfig) -> Self {
        Self { store, config }
    }

    pub fn trips(&self) -> TripService {
        TripService::new(self.store.clone())
    }

    pub fn maintenance(&self) -> MaintenanceService {
        MaintenanceService::new(self.store.clone())
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.store.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.store.clone(),
            JwtConfig::from(&self.config),
            self.config.bcrypt_cost,
        )
    }
}
