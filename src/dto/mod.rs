//! DTOs de la API
//!
//! Bodies de request (validados con `validator`) y shapes de response.

pub mod api_response;
pub mod auth_dto;
pub mod driver_dto;
pub mod fuel_dto;
pub mod maintenance_dto;
pub mod trip_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
