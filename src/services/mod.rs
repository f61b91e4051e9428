//! Servicios del sistema
//!
//! Este módulo contiene el servicio de datos (RemoteStore) y el servicio
//! de autenticación (AuthProvider) sobre el cliente HTTP.

pub mod auth_service;
pub mod database_service;

pub use auth_service::{login_error_message, AuthProvider, AuthService, SessionChange};
pub use database_service::{DatabaseService, RemoteStore};
