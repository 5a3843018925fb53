//! Servicio de ciclo de vida de viajes
//!
//! Valida la creación de viajes contra el estado del vehículo y del
//! conductor, y aplica cada transición junto con sus efectos sobre ambos
//! en un único `ChangeSet`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::trip_dto::{CreateTripRequest, TransitionTripRequest};
use crate::models::{
    driver::{Driver, DriverStatus},
    trip::{Trip, TripFilters, TripStatus},
    vehicle::{Vehicle, VehicleStatus},
};
use crate::repositories::{ChangeSet, FleetStore};
use crate::services::trip_state_machine::next_status;
use crate::utils::errors::{not_found_error, AppError, AppResult, RuleViolation, StateConflict};
use crate::utils::rounding::money;

pub struct TripService {
    store: Arc<dyn FleetStore>,
}

impl TripService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Crear un viaje en `draft`
    ///
    /// Ambos ids se resuelven antes de cualquier regla. Las precondiciones
    /// se evalúan en orden y gana el primer fallo: vehículo disponible,
    /// licencia vigente, conductor asignable, carga dentro de la capacidad y
    /// categoría de licencia compatible.
    pub async fn create(&self, request: CreateTripRequest, now: DateTime<Utc>) -> AppResult<Trip> {
        let vehicle = self.load_vehicle(request.vehicle_id).await?;
        let driver = self.load_driver(request.driver_id).await?;

        ensure_vehicle_available(&vehicle)?;
        ensure_license_valid(&driver, now)?;
        ensure_driver_assignable(&driver)?;

        if request.cargo_weight > vehicle.capacity {
            return Err(reject(RuleViolation::CapacityExceeded {
                cargo_weight: request.cargo_weight,
                capacity: vehicle.capacity,
            }));
        }

        if let (Some(category), Some(vehicle_type)) = (&driver.license_category, &vehicle.vehicle_type) {
            if !category.eq_ignore_ascii_case(vehicle_type) {
                return Err(reject(RuleViolation::LicenseMismatch {
                    license_category: category.clone(),
                    vehicle_type: vehicle_type.clone(),
                }));
            }
        }

        let trip = Trip {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            cargo_weight: request.cargo_weight,
            origin: request.origin,
            destination: request.destination,
            status: TripStatus::Draft,
            start_odometer: Some(vehicle.odometer),
            end_odometer: None,
            estimated_fuel_cost: money(request.estimated_fuel_cost.unwrap_or(Decimal::ZERO)),
            revenue: money(request.revenue.unwrap_or(Decimal::ZERO)),
            created_at: now,
            completed_at: None,
        };

        self.store.commit(ChangeSet::new().insert_trip(trip.clone())).await?;

        info!(
            "📝 Trip {} creado: vehículo {} ({}), conductor {}, {}kg",
            trip.id, vehicle.plate, vehicle.id, driver.id, trip.cargo_weight
        );
        Ok(trip)
    }

    /// Aplicar una transición de estado
    pub async fn transition(
        &self,
        id: Uuid,
        request: TransitionTripRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Trip> {
        let mut trip = self.get(id).await?;
        let from = trip.status;
        let to = next_status(from, &request.status).map_err(reject)?;

        let mut vehicle = self.load_vehicle(trip.vehicle_id).await?;
        let mut driver = self.load_driver(trip.driver_id).await?;
        let vehicle_before = vehicle.status;
        let driver_before = driver.status;

        let mut changes = ChangeSet::new();
        match to {
            TripStatus::Dispatched => {
                ensure_vehicle_available(&vehicle)?;
                ensure_license_valid(&driver, now)?;
                ensure_driver_assignable(&driver)?;
                vehicle.status = VehicleStatus::OnTrip;
                driver.status = DriverStatus::OnTrip;
                changes = changes
                    .update_vehicle(vehicle, vehicle_before)
                    .update_driver(driver, driver_before);
            }
            TripStatus::Completed => {
                let end_odometer = request
                    .end_odometer
                    .ok_or_else(|| reject(RuleViolation::MissingField { field: "end_odometer" }))?;
                let start_odometer = trip.start_odometer.unwrap_or(0.0);
                if end_odometer < start_odometer {
                    return Err(reject(RuleViolation::OdometerRegression {
                        start_odometer,
                        end_odometer,
                    }));
                }

                trip.end_odometer = Some(end_odometer);
                trip.completed_at = Some(now);
                vehicle.odometer = vehicle.odometer.max(end_odometer);
                vehicle.status = VehicleStatus::Available;
                driver.status = DriverStatus::OffDuty;
                driver.reward_completed_trip();
                changes = changes
                    .update_vehicle(vehicle, vehicle_before)
                    .update_driver(driver, driver_before);
            }
            TripStatus::Cancelled => {
                // Un draft no reservó nada
                if from == TripStatus::Dispatched {
                    vehicle.status = VehicleStatus::Available;
                    driver.status = DriverStatus::OffDuty;
                    changes = changes
                        .update_vehicle(vehicle, vehicle_before)
                        .update_driver(driver, driver_before);
                }
            }
            TripStatus::Draft => {
                return Err(AppError::Internal(format!(
                    "state machine returned draft for trip {}",
                    trip.id
                )))
            }
        }

        trip.status = to;
        self.store.commit(changes.update_trip(trip.clone(), from)).await?;

        info!("🚚 Trip {}: {} → {}", trip.id, from, to);
        Ok(trip)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Trip> {
        self.store
            .find_trip(id)
            .await?
            .ok_or_else(|| not_found_error("Trip", id))
    }

    pub async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        self.store.list_trips(filters).await
    }

    async fn load_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    async fn load_driver(&self, id: Uuid) -> AppResult<Driver> {
        self.store
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", id))
    }
}

fn reject(rule: RuleViolation) -> AppError {
    warn!("⛔ Regla de viaje violada: {}", rule);
    AppError::Rule(rule)
}

fn ensure_license_valid(driver: &Driver, now: DateTime<Utc>) -> AppResult<()> {
    if driver.is_license_valid(now.date_naive()) {
        return Ok(());
    }
    Err(reject(RuleViolation::LicenseInvalid {
        license_expiry: driver.license_expiry,
    }))
}

fn ensure_vehicle_available(vehicle: &Vehicle) -> Result<(), StateConflict> {
    if vehicle.is_available() {
        return Ok(());
    }
    Err(StateConflict::VehicleUnavailable {
        vehicle_id: vehicle.id,
        status: vehicle.status,
    })
}

fn ensure_driver_assignable(driver: &Driver) -> Result<(), StateConflict> {
    if driver.status.is_assignable() {
        return Ok(());
    }
    Err(StateConflict::DriverUnavailable {
        driver_id: driver.id,
        status: driver.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryFleetStore;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn truck(capacity: f64, odometer: f64) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: Some("Volvo FH".to_string()),
            model: None,
            plate: format!("TR-{}", &Uuid::new_v4().to_string()[..6]),
            vehicle_type: Some("Truck".to_string()),
            capacity,
            odometer,
            region: Some("North".to_string()),
            status: VehicleStatus::Available,
            acquisition_cost: Decimal::new(50_000, 0),
            created_at: now(),
        }
    }

    fn truck_driver() -> Driver {
        Driver {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            license_number: Some(Uuid::new_v4().to_string()),
            license_expiry: NaiveDate::from_ymd_opt(2027, 1, 1),
            license_category: Some("Truck".to_string()),
            status: DriverStatus::OffDuty,
            safety_score: 90.0,
            created_at: now(),
        }
    }

    async fn setup(vehicle: Vehicle, driver: Driver) -> (TripService, Arc<MemoryFleetStore>, Vehicle, Driver) {
        let store = Arc::new(MemoryFleetStore::new());
        store.insert_vehicle(&vehicle).await.unwrap();
        store.insert_driver(&driver).await.unwrap();
        (TripService::new(store.clone()), store, vehicle, driver)
    }

    fn request(vehicle: &Vehicle, driver: &Driver, cargo_weight: f64) -> CreateTripRequest {
        CreateTripRequest {
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            cargo_weight,
            origin: Some("Depot".to_string()),
            destination: Some("Port".to_string()),
            estimated_fuel_cost: None,
            revenue: Some(Decimal::new(500, 0)),
        }
    }

    fn to(status: &str, end_odometer: Option<f64>) -> TransitionTripRequest {
        TransitionTripRequest {
            status: status.to_string(),
            end_odometer,
        }
    }

    #[tokio::test]
    async fn cargo_over_capacity_is_rejected_with_both_values() {
        let (service, store, vehicle, driver) = setup(truck(1000.0, 5000.0), truck_driver()).await;

        let err = service.create(request(&vehicle, &driver, 1200.0), now()).await.unwrap_err();
        match err {
            AppError::Rule(RuleViolation::CapacityExceeded { cargo_weight, capacity }) => {
                assert_eq!(cargo_weight, 1200.0);
                assert_eq!(capacity, 1000.0);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.list_trips(&TripFilters::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cargo_equal_to_capacity_is_accepted() {
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), truck_driver()).await;
        assert!(service.create(request(&vehicle, &driver, 1000.0), now()).await.is_ok());
    }

    #[tokio::test]
    async fn any_cargo_above_capacity_is_rejected() {
        for capacity in [0.5, 1.0, 750.25, 1000.0, 12_345.678, 1_000_000.0] {
            let (service, store, vehicle, driver) = setup(truck(capacity, 0.0), truck_driver()).await;
            let just_above = f64::from_bits(capacity.to_bits() + 1);
            let just_below = f64::from_bits(capacity.to_bits() - 1);

            for cargo in [just_above, capacity + 0.001, capacity * 1.5, capacity + 1.0e5] {
                let err = service.create(request(&vehicle, &driver, cargo), now()).await.unwrap_err();
                assert!(
                    matches!(
                        err,
                        AppError::Rule(RuleViolation::CapacityExceeded { cargo_weight, capacity: c })
                            if cargo_weight == cargo && c == capacity
                    ),
                    "cargo {} on capacity {}",
                    cargo,
                    capacity
                );
            }
            assert!(store.list_trips(&TripFilters::default()).await.unwrap().is_empty());

            for cargo in [0.0, just_below, capacity] {
                assert!(
                    service.create(request(&vehicle, &driver, cargo), now()).await.is_ok(),
                    "cargo {} on capacity {}",
                    cargo,
                    capacity
                );
            }
        }
    }

    #[tokio::test]
    async fn unknown_driver_is_not_found_even_when_vehicle_is_busy() {
        let mut vehicle = truck(1000.0, 0.0);
        vehicle.status = VehicleStatus::InShop;
        let (service, _, vehicle, _) = setup(vehicle, truck_driver()).await;

        let mut ghost = truck_driver();
        ghost.id = Uuid::new_v4();
        let err = service.create(request(&vehicle, &ghost, 10.0), now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn every_non_available_vehicle_status_is_a_conflict() {
        for status in [VehicleStatus::OnTrip, VehicleStatus::InShop, VehicleStatus::Retired] {
            let mut vehicle = truck(1000.0, 0.0);
            vehicle.status = status;
            let (service, _, vehicle, driver) = setup(vehicle, truck_driver()).await;

            let err = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    AppError::Conflict(StateConflict::VehicleUnavailable { status: s, .. }) if s == status
                ),
                "status {}",
                status
            );
        }
    }

    #[tokio::test]
    async fn expired_license_is_checked_before_driver_status() {
        let mut driver = truck_driver();
        driver.license_expiry = NaiveDate::from_ymd_opt(2025, 3, 13);
        driver.status = DriverStatus::Suspended;
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;

        let err = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap_err();
        assert!(matches!(err, AppError::Rule(RuleViolation::LicenseInvalid { .. })));
    }

    #[tokio::test]
    async fn license_expiring_today_is_still_valid() {
        let mut driver = truck_driver();
        driver.license_expiry = Some(now().date_naive());
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;
        assert!(service.create(request(&vehicle, &driver, 10.0), now()).await.is_ok());
    }

    #[tokio::test]
    async fn suspended_driver_is_a_conflict() {
        let mut driver = truck_driver();
        driver.status = DriverStatus::Suspended;
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;

        let err = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict(StateConflict::DriverUnavailable { status: DriverStatus::Suspended, .. })
        ));
    }

    #[tokio::test]
    async fn license_category_must_match_vehicle_type() {
        let mut driver = truck_driver();
        driver.license_category = Some("Van".to_string());
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;

        let err = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: License mismatch: driver holds 'Van' license but vehicle is a 'Truck'"
        );
    }

    #[tokio::test]
    async fn license_category_match_ignores_case() {
        let mut driver = truck_driver();
        driver.license_category = Some("truck".to_string());
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;
        assert!(service.create(request(&vehicle, &driver, 10.0), now()).await.is_ok());
    }

    #[tokio::test]
    async fn full_lifecycle_updates_vehicle_and_driver() {
        let (service, store, vehicle, driver) = setup(truck(1000.0, 5000.0), truck_driver()).await;

        let trip = service.create(request(&vehicle, &driver, 800.0), now()).await.unwrap();
        assert_eq!(trip.status, TripStatus::Draft);
        assert_eq!(trip.start_odometer, Some(5000.0));
        // draft no reserva
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::Available);
        assert_eq!(store.find_driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OffDuty);

        let trip = service.transition(trip.id, to("dispatched", None), now()).await.unwrap();
        assert_eq!(trip.status, TripStatus::Dispatched);
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::OnTrip);
        assert_eq!(store.find_driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OnTrip);

        let finished_at = now() + Duration::hours(6);
        let trip = service
            .transition(trip.id, to("completed", Some(5150.0)), finished_at)
            .await
            .unwrap();
        assert_eq!(trip.status, TripStatus::Completed);
        assert_eq!(trip.distance_km(), 150.0);
        assert_eq!(trip.completed_at, Some(finished_at));

        let vehicle = store.find_vehicle(vehicle.id).await.unwrap().unwrap();
        assert_eq!(vehicle.odometer, 5150.0);
        assert_eq!(vehicle.status, VehicleStatus::Available);
        let driver = store.find_driver(driver.id).await.unwrap().unwrap();
        assert_eq!(driver.status, DriverStatus::OffDuty);
        assert_eq!(driver.safety_score, 91.0);
    }

    #[tokio::test]
    async fn safety_score_never_exceeds_maximum() {
        let mut driver = truck_driver();
        driver.safety_score = 100.0;
        let (service, store, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;

        for round in 0..3 {
            let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
            service.transition(trip.id, to("dispatched", None), now()).await.unwrap();
            let end = (round + 1) as f64 * 10.0;
            service.transition(trip.id, to("completed", Some(end)), now()).await.unwrap();
        }

        let driver = store.find_driver(driver.id).await.unwrap().unwrap();
        assert_eq!(driver.safety_score, 100.0);
    }

    #[tokio::test]
    async fn second_dispatch_is_rejected() {
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), truck_driver()).await;
        let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();

        service.transition(trip.id, to("dispatched", None), now()).await.unwrap();
        let err = service.transition(trip.id, to("dispatched", None), now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Rule(RuleViolation::InvalidTransition { from: TripStatus::Dispatched, .. })
        ));
    }

    #[tokio::test]
    async fn dispatch_rechecks_vehicle_availability() {
        let (service, _, vehicle, driver) = setup(truck(1000.0, 0.0), truck_driver()).await;
        let first = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        let second = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();

        service.transition(first.id, to("dispatched", None), now()).await.unwrap();
        let err = service.transition(second.id, to("dispatched", None), now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict(StateConflict::VehicleUnavailable { status: VehicleStatus::OnTrip, .. })
        ));
        assert_eq!(service.get(second.id).await.unwrap().status, TripStatus::Draft);
    }

    #[tokio::test]
    async fn dispatch_rejects_license_expired_since_draft() {
        let mut driver = truck_driver();
        driver.license_expiry = Some(now().date_naive());
        let (service, store, vehicle, driver) = setup(truck(1000.0, 0.0), driver).await;
        let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();

        let later = now() + Duration::days(2);
        let err = service.transition(trip.id, to("dispatched", None), later).await.unwrap_err();
        assert!(matches!(err, AppError::Rule(RuleViolation::LicenseInvalid { .. })));
        assert_eq!(service.get(trip.id).await.unwrap().status, TripStatus::Draft);
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::Available);
        assert_eq!(store.find_driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OffDuty);
    }

    #[tokio::test]
    async fn completed_distance_is_never_negative() {
        let cases = [
            (0.0, 0.0),
            (0.0, 0.1),
            (5000.0, 5000.0),
            (5000.0, 5150.0),
            (5000.0, 4999.9),
            (5000.0, 0.0),
            (123_456.7, 123_456.6),
            (123_456.7, 9_999_999.0),
        ];

        for (start, end) in cases {
            let (service, store, vehicle, driver) = setup(truck(1000.0, start), truck_driver()).await;
            let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
            service.transition(trip.id, to("dispatched", None), now()).await.unwrap();

            match service.transition(trip.id, to("completed", Some(end)), now()).await {
                Ok(done) => {
                    assert!(end >= start, "{} -> {} was accepted", start, end);
                    assert!(done.distance_km() >= 0.0);
                    assert_eq!(done.distance_km(), end - start);
                    let vehicle = store.find_vehicle(vehicle.id).await.unwrap().unwrap();
                    assert!(vehicle.odometer >= start);
                }
                Err(err) => {
                    assert!(end < start, "{} -> {} was rejected", start, end);
                    assert!(matches!(err, AppError::Rule(RuleViolation::OdometerRegression { .. })));
                    let trip = service.get(trip.id).await.unwrap();
                    assert_eq!(trip.status, TripStatus::Dispatched);
                    assert_eq!(trip.distance_km(), 0.0);
                }
            }
        }
    }

    #[tokio::test]
    async fn completion_requires_end_odometer() {
        let (service, _, vehicle, driver) = setup(truck(1000.0, 100.0), truck_driver()).await;
        let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        service.transition(trip.id, to("dispatched", None), now()).await.unwrap();

        let err = service.transition(trip.id, to("completed", None), now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Rule(RuleViolation::MissingField { field: "end_odometer" })
        ));
    }

    #[tokio::test]
    async fn completion_rejects_odometer_regression() {
        let (service, store, vehicle, driver) = setup(truck(1000.0, 100.0), truck_driver()).await;
        let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        service.transition(trip.id, to("dispatched", None), now()).await.unwrap();

        let err = service.transition(trip.id, to("completed", Some(99.0)), now()).await.unwrap_err();
        assert!(matches!(err, AppError::Rule(RuleViolation::OdometerRegression { .. })));

        // nada cambió
        assert_eq!(service.get(trip.id).await.unwrap().status, TripStatus::Dispatched);
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::OnTrip);
    }

    #[tokio::test]
    async fn cancelling_dispatched_trip_releases_vehicle_and_driver() {
        let (service, store, vehicle, driver) = setup(truck(1000.0, 0.0), truck_driver()).await;
        let trip = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        service.transition(trip.id, to("dispatched", None), now()).await.unwrap();

        let trip = service.transition(trip.id, to("cancelled", None), now()).await.unwrap();
        assert_eq!(trip.status, TripStatus::Cancelled);
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::Available);
        assert_eq!(store.find_driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OffDuty);
    }

    #[tokio::test]
    async fn cancelling_draft_leaves_vehicle_untouched() {
        let (service, store, vehicle, driver) = setup(truck(1000.0, 0.0), truck_driver()).await;
        let draft = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        let other = service.create(request(&vehicle, &driver, 10.0), now()).await.unwrap();
        service.transition(other.id, to("dispatched", None), now()).await.unwrap();

        service.transition(draft.id, to("cancelled", None), now()).await.unwrap();
        assert_eq!(store.find_vehicle(vehicle.id).await.unwrap().unwrap().status, VehicleStatus::OnTrip);
        assert_eq!(store.find_driver(driver.id).await.unwrap().unwrap().status, DriverStatus::OnTrip);
    }

    #[tokio::test]
    async fn unknown_trip_is_not_found() {
        let (service, _, _, _) = setup(truck(1000.0, 0.0), truck_driver()).await;
        let err = service.transition(Uuid::new_v4(), to("dispatched", None), now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
