//! Fleet Management - núcleo de dominio
//!
//! Contenedor de estado de dominio para gestión de flota (conductores,
//! vehículos, rutas, categorías y asignaciones) contra un store remoto con
//! autenticación. Las colecciones viven solo en memoria: se cargan al abrir
//! sesión y se vacían al cerrarla.

pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod utils;

pub use client::SupabaseClient;
pub use config::EnvironmentConfig;
pub use session::{SessionGate, SessionStatus, SignInOutcome};
pub use state::{AppState, NO_CATEGORY};
pub use utils::errors::{AppError, AppResult};
