use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverResponse, UpdateDriverRequest};
use crate::models::driver::{Driver, DriverFilters, DriverStatus, MAX_SAFETY_SCORE};
use crate::repositories::{ChangeSet, FleetStore};
use crate::utils::errors::{not_found_error, AppError, RuleViolation, StateConflict};

pub struct DriverController {
    store: Arc<dyn FleetStore>,
}

impl DriverController {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
        now: DateTime<Utc>,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        let driver = Driver {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            license_number: request.license_number,
            license_expiry: request.license_expiry,
            license_category: request.license_category,
            status: DriverStatus::OffDuty,
            safety_score: request.safety_score.unwrap_or(MAX_SAFETY_SCORE),
            created_at: now,
        };

        self.store.insert_driver(&driver).await?;
        info!("🧑‍✈️ Conductor creado: {} ({})", driver.name, driver.id);

        Ok(ApiResponse::success_with_message(
            DriverResponse::new(driver, now.date_naive()),
            "Driver created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid, today: NaiveDate) -> Result<DriverResponse, AppError> {
        Ok(DriverResponse::new(self.load(id).await?, today))
    }

    pub async fn list(
        &self,
        filters: &DriverFilters,
        today: NaiveDate,
    ) -> Result<Vec<DriverResponse>, AppError> {
        let drivers = self.store.list_drivers(filters).await?;
        Ok(drivers
            .into_iter()
            .map(|d| DriverResponse::new(d, today))
            .collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
        today: NaiveDate,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        let mut driver = self.load(id).await?;
        let before = driver.status;

        if let Some(status) = request.status {
            if status == DriverStatus::OnTrip {
                return Err(RuleViolation::FieldNotAllowed {
                    field: "status",
                    value: status.to_string(),
                }
                .into());
            }
            if before == DriverStatus::OnTrip {
                return Err(StateConflict::DriverUnavailable {
                    driver_id: driver.id,
                    status: before,
                }
                .into());
            }
            driver.status = status;
        }

        if let Some(name) = request.name {
            driver.name = name;
        }
        if let Some(number) = request.license_number {
            driver.license_number = Some(number);
        }
        if let Some(expiry) = request.license_expiry {
            driver.license_expiry = Some(expiry);
        }
        if let Some(category) = request.license_category {
            driver.license_category = Some(category);
        }
        if let Some(score) = request.safety_score {
            driver.safety_score = score.min(MAX_SAFETY_SCORE);
        }

        self.store
            .commit(ChangeSet::new().update_driver(driver.clone(), before))
            .await?;
        info!("🧑‍✈️ Conductor actualizado: {} (estado: {})", driver.name, driver.status);

        Ok(ApiResponse::success_with_message(
            DriverResponse::new(driver, today),
            "Driver updated".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_driver(id).await?;
        info!("🗑️ Conductor eliminado: {}", id);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Driver, AppError> {
        self.store
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))
    }
}
