//! Utilidades del sistema
//!
//! Este módulo contiene el sistema de errores y las utilidades de validación.

pub mod errors;
pub mod validation;
