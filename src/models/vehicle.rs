//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla `vehicles` del store remoto; el tipo de
//! vehículo viaja en el campo `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Tipo de vehículo - conjunto abierto, los valores desconocidos caen en Other
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleType {
    Bus,
    MiniBus,
    Van,
    TypeIii,
    Truck,
    #[serde(other)]
    Other,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bus => "bus",
            VehicleType::MiniBus => "mini-bus",
            VehicleType::Van => "van",
            VehicleType::TypeIii => "type-iii",
            VehicleType::Truck => "truck",
            VehicleType::Other => "other",
        }
    }
}

/// Estado del vehículo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::InUse => "in-use",
            VehicleStatus::Maintenance => "maintenance",
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_number: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license_plate: Option<String>,
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub vehicle_number: String,

    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[validate(custom = "crate::utils::validation::validate_vehicle_year")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[validate(custom = "crate::utils::validation::validate_license_plate")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,

    pub status: VehicleStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
