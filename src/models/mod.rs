//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema remoto con las convenciones estándar.

pub mod assignment;
pub mod auth;
pub mod category;
pub mod driver;
pub mod route;
pub mod vehicle;

pub use assignment::{Assignment, AssignmentStatus, CreateAssignmentRequest};
pub use auth::{AuthChangeEvent, Session, User};
pub use category::{Category, CreateCategoryRequest};
pub use driver::{CreateDriverRequest, Driver, DriverStatus};
pub use route::{CreateRoutePairRequest, CreateRouteRequest, Route, RouteType};
pub use vehicle::{CreateVehicleRequest, Vehicle, VehicleStatus, VehicleType};
