//! Controllers CRUD
//!
//! Alta, consulta, edición y baja de vehículos, conductores y cargas de
//! combustible. Las reglas del ciclo de viaje viven en `services`.

pub mod driver_controller;
pub mod fuel_controller;
pub mod vehicle_controller;
