//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT y redondeo de métricas.

pub mod errors;
pub mod jwt;
pub mod rounding;
pub mod validation;
