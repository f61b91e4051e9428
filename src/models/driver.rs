//! Modelo de Driver
//!
//! Este módulo contiene el struct Driver y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla `drivers` del store remoto.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Estado del conductor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
        }
    }
}

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license_expiry: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dot_expiry: Option<NaiveDate>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub emergency_phone: Option<String>,
    pub status: DriverStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Driver {
    /// Nombre completo para mostrar en listados
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request para crear un nuevo conductor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub first_name: String,

    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub last_name: String,

    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub license_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_expiry: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_expiry: Option<NaiveDate>,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: String,

    #[validate(custom = "crate::utils::validation::validate_email")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_phone: Option<String>,

    pub status: DriverStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
