//! Modelo de Category
//!
//! Este módulo contiene el struct Category para agrupar rutas.
//! El nombre es único por usuario (case-insensitive) y una categoría no puede
//! eliminarse mientras alguna ruta la referencie.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Category principal - mapea exactamente a la tabla categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Color de display en formato hex (p.ej. "#4A90E2")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request para crear una nueva categoría
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
