//! Modelo de Route
//!
//! Este módulo contiene el struct Route y sus variantes para CRUD operations.
//! Una ruta física se representa con DOS filas (AM y PM) que comparten todos
//! los campos excepto `route_type` y `check_in_time`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Turno de la ruta - una ruta nueva siempre materializa el par AM/PM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteType {
    Am,
    Pm,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Am => "AM",
            RouteType::Pm => "PM",
        }
    }
}

/// Route principal - mapea exactamente a la tabla routes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: Uuid,
    pub user_id: Uuid,
    pub route_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub route_number: Option<String>,
    pub route_type: RouteType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category_id: Option<Uuid>,
    /// Hora de check-in como texto libre para mostrar (p.ej. "7:15 AM")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub check_in_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub school_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stops: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
    /// Duración estimada en minutos
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request para crear una fila de ruta (un solo turno)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRouteRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub route_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_number: Option<String>,

    pub route_type: RouteType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<String>>,

    #[validate(custom = "crate::utils::validation::validate_positive")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[validate(custom = "crate::utils::validation::validate_positive")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request para crear el par AM/PM de una ruta a partir de un solo formulario.
/// Todos los campos se comparten salvo el check-in de cada turno.
#[derive(Debug, Clone, Validate)]
pub struct CreateRoutePairRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub route_name: String,
    pub route_number: Option<String>,
    pub category_id: Option<Uuid>,
    pub am_check_in_time: Option<String>,
    pub pm_check_in_time: Option<String>,
    pub school_name: Option<String>,
    pub stops: Option<Vec<String>>,
    #[validate(custom = "crate::utils::validation::validate_positive")]
    pub distance: Option<f64>,
    #[validate(custom = "crate::utils::validation::validate_positive")]
    pub estimated_time: Option<i32>,
    pub notes: Option<String>,
}

impl CreateRoutePairRequest {
    /// Expande el formulario en los dos requests de inserción (AM, PM)
    pub fn into_requests(self) -> (CreateRouteRequest, CreateRouteRequest) {
        let am = CreateRouteRequest {
            route_name: self.route_name.clone(),
            route_number: self.route_number.clone(),
            route_type: RouteType::Am,
            category_id: self.category_id,
            check_in_time: self.am_check_in_time,
            school_name: self.school_name.clone(),
            stops: self.stops.clone(),
            distance: self.distance,
            estimated_time: self.estimated_time,
            notes: self.notes.clone(),
        };
        let pm = CreateRouteRequest {
            route_name: self.route_name,
            route_number: self.route_number,
            route_type: RouteType::Pm,
            category_id: self.category_id,
            check_in_time: self.pm_check_in_time,
            school_name: self.school_name,
            stops: self.stops,
            distance: self.distance,
            estimated_time: self.estimated_time,
            notes: self.notes,
        };
        (am, pm)
    }
}
