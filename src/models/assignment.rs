//! Modelo de Assignment
//!
//! Este módulo contiene el struct Assignment que relaciona conductor,
//! vehículo y ruta. El store remoto resuelve e incrusta los registros
//! relacionados en cada fetch/create/update. A lo sumo una asignación
//! "ocupante" puede referenciar un vehículo a la vez.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Driver, Route, Vehicle};

/// Estado de la asignación. Los estados `assigned` y `accepted` ocupan el
/// vehículo; `completed` lo libera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Assigned,
    Accepted,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Completed => "completed",
        }
    }

    /// true si el estado cuenta para la restricción de un-vehículo-una-asignación
    pub fn is_occupying(&self) -> bool {
        matches!(self, AssignmentStatus::Assigned | AssignmentStatus::Accepted)
    }

    /// Lista de estados ocupantes en formato wire, para filtros del store
    pub fn occupying_values() -> &'static [&'static str] {
        &["assigned", "accepted"]
    }
}

/// Assignment principal - mapea a la tabla assignments con las relaciones
/// driver/vehicle/route incrustadas por el resolver del store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub driver_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vehicle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub route_id: Option<Uuid>,
    pub status: AssignmentStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,

    // Relaciones incrustadas (solo lectura, las resuelve el servidor)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub driver: Option<Driver>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vehicle: Option<Vehicle>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub route: Option<Route>,
}

/// Request para crear una nueva asignación
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    pub driver_id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<Uuid>,

    pub status: AssignmentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
