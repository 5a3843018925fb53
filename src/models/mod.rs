pub mod analytics;
pub mod driver;
pub mod fuel;
pub mod maintenance;
pub mod trip;
pub mod user;
pub mod vehicle;
