//! Servicio de datos contra el store remoto
//!
//! Este módulo define el trait RemoteStore (la interfaz que consume el
//! contenedor de estado) y su implementación de producción DatabaseService,
//! que agrega el scope de usuario a cada operación y ejecuta los chequeos de
//! consistencia que el cliente emite antes de escribir (vehículo ocupado,
//! categoría referenciada, nombre de categoría duplicado).

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::client::SupabaseClient;
use crate::models::{
    Assignment, AssignmentStatus, Category, CreateAssignmentRequest, CreateCategoryRequest,
    CreateDriverRequest, CreateRouteRequest, CreateVehicleRequest, Driver, Route, Vehicle,
};
use crate::utils::errors::{forbidden_error, internal_error, not_found_error, AppError, AppResult};

/// Select con las relaciones incrustadas que resuelve el servidor para
/// las asignaciones
const ASSIGNMENT_SELECT: &str = "*,driver:drivers(*),vehicle:vehicles(*),route:routes(*)";

/// Interfaz del store remoto tal como la consume el contenedor de estado.
/// Cada operación está scopeada al usuario autenticado.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_drivers(&self) -> AppResult<Vec<Driver>>;
    async fn add_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver>;
    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver>;
    async fn delete_driver(&self, id: Uuid) -> AppResult<()>;

    async fn get_vehicles(&self) -> AppResult<Vec<Vehicle>>;
    async fn add_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle>;
    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle>;
    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()>;

    async fn get_routes(&self) -> AppResult<Vec<Route>>;
    async fn add_route(&self, request: &CreateRouteRequest) -> AppResult<Route>;
    async fn update_route(&self, route: &Route) -> AppResult<Route>;
    async fn delete_route(&self, id: Uuid) -> AppResult<()>;

    async fn get_categories(&self) -> AppResult<Vec<Category>>;
    async fn add_category(&self, request: &CreateCategoryRequest) -> AppResult<Category>;
    async fn update_category(&self, category: &Category) -> AppResult<Category>;
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>>;
    async fn add_assignment(&self, request: &CreateAssignmentRequest) -> AppResult<Assignment>;
    async fn update_assignment(&self, assignment: &Assignment) -> AppResult<Assignment>;
    async fn delete_assignment(&self, id: Uuid) -> AppResult<()>;

    /// Asignaciones de un conductor concreto, más recientes primero
    async fn get_assignments_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Assignment>>;
    /// Asignaciones que actualmente ocupan un vehículo
    async fn get_active_assignments(&self) -> AppResult<Vec<Assignment>>;
}

/// Implementación de producción de RemoteStore sobre SupabaseClient
pub struct DatabaseService {
    client: SupabaseClient,
}

impl DatabaseService {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Serializa un request de creación agregando el user_id del dueño
    fn scoped_body<T: serde::Serialize>(&self, request: &T, user_id: Uuid) -> AppResult<Value> {
        let mut value = serde_json::to_value(request)
            .map_err(|e| internal_error(&format!("Serialization error: {}", e)))?;
        if let Some(object) = value.as_object_mut() {
            object.insert("user_id".to_string(), Value::String(user_id.to_string()));
        }
        Ok(value)
    }

    /// Serializa una entidad completa como cuerpo de update, quitando los
    /// campos que asigna el servidor y las relaciones incrustadas
    fn update_body<T: serde::Serialize>(&self, entity: &T) -> AppResult<Value> {
        let mut value = serde_json::to_value(entity)
            .map_err(|e| internal_error(&format!("Serialization error: {}", e)))?;
        if let Some(object) = value.as_object_mut() {
            for key in ["id", "user_id", "created_at", "driver", "vehicle", "route"] {
                object.remove(key);
            }
            object.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(value)
    }

    async fn get_all<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        order: &str,
    ) -> AppResult<Vec<T>> {
        let user = self.client.require_user().await?;
        self.client
            .select(
                table,
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user.id)),
                    ("order", order.to_string()),
                ],
            )
            .await
    }
}

#[async_trait]
impl RemoteStore for DatabaseService {
    // ==================== Drivers ====================

    async fn get_drivers(&self) -> AppResult<Vec<Driver>> {
        self.get_all("drivers", "created_at.desc").await
    }

    async fn add_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let user = self.client.require_user().await?;
        let body = self.scoped_body(request, user.id)?;
        log::info!("📋 Creando conductor para el usuario {}", user.id);
        self.client.insert("drivers", "*", &body).await
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver> {
        let user = self.client.require_user().await?;
        let body = self.update_body(driver)?;
        let mut rows: Vec<Driver> = self
            .client
            .update("drivers", "*", driver.id, user.id, &body)
            .await?;
        rows.pop()
            .ok_or_else(|| not_found_error("Driver", &driver.id.to_string()))
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let user = self.client.require_user().await?;
        self.client.delete("drivers", id, user.id).await
    }

    // ==================== Vehicles ====================

    async fn get_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.get_all("vehicles", "created_at.desc").await
    }

    async fn add_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle> {
        let user = self.client.require_user().await?;
        let body = self.scoped_body(request, user.id)?;
        log::info!("🚌 Creando vehículo para el usuario {}", user.id);
        self.client.insert("vehicles", "*", &body).await
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let user = self.client.require_user().await?;
        let body = self.update_body(vehicle)?;
        let mut rows: Vec<Vehicle> = self
            .client
            .update("vehicles", "*", vehicle.id, user.id, &body)
            .await?;
        rows.pop()
            .ok_or_else(|| not_found_error("Vehicle", &vehicle.id.to_string()))
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let user = self.client.require_user().await?;
        self.client.delete("vehicles", id, user.id).await
    }

    // ==================== Routes ====================

    async fn get_routes(&self) -> AppResult<Vec<Route>> {
        self.get_all("routes", "created_at.desc").await
    }

    async fn add_route(&self, request: &CreateRouteRequest) -> AppResult<Route> {
        let user = self.client.require_user().await?;
        let body = self.scoped_body(request, user.id)?;
        log::info!(
            "🗺️ Creando ruta '{}' ({}) para el usuario {}",
            request.route_name,
            request.route_type.as_str(),
            user.id
        );
        self.client.insert("routes", "*", &body).await
    }

    async fn update_route(&self, route: &Route) -> AppResult<Route> {
        let user = self.client.require_user().await?;
        let body = self.update_body(route)?;
        let mut rows: Vec<Route> = self
            .client
            .update("routes", "*", route.id, user.id, &body)
            .await?;

        if let Some(updated) = rows.pop() {
            return Ok(updated);
        }

        // Cero filas afectadas: distinguir "no existe" de "pertenece a otro
        // usuario" consultando la fila solo por id
        let probe: Vec<RouteOwnerProbe> = self
            .client
            .select(
                "routes",
                &[
                    ("select", "id,user_id".to_string()),
                    ("id", format!("eq.{}", route.id)),
                ],
            )
            .await?;

        match probe.first() {
            None => Err(AppError::NotFound(format!(
                "Route with id '{}' does not exist",
                route.id
            ))),
            Some(row) if row.user_id != user.id => Err(forbidden_error(
                "update route",
                &format!("route with id '{}' belongs to another user", route.id),
            )),
            Some(_) => Err(AppError::NotFound(
                "Route not found or you do not have permission to update it".to_string(),
            )),
        }
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<()> {
        let user = self.client.require_user().await?;
        self.client.delete("routes", id, user.id).await
    }

    // ==================== Categories ====================

    async fn get_categories(&self) -> AppResult<Vec<Category>> {
        // Las categorías se ordenan alfabéticamente, no por fecha
        self.get_all("categories", "name.asc").await
    }

    async fn add_category(&self, request: &CreateCategoryRequest) -> AppResult<Category> {
        let user = self.client.require_user().await?;

        // Chequeo de nombre duplicado (case-insensitive) antes de insertar
        let duplicates: Vec<Category> = self
            .client
            .select(
                "categories",
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user.id)),
                    ("name", format!("ilike.{}", request.name.trim())),
                ],
            )
            .await?;
        if !duplicates.is_empty() {
            return Err(AppError::Conflict(format!(
                "A category named '{}' already exists. Please choose a different name.",
                request.name.trim()
            )));
        }

        let body = self.scoped_body(request, user.id)?;
        self.client.insert("categories", "*", &body).await
    }

    async fn update_category(&self, category: &Category) -> AppResult<Category> {
        let user = self.client.require_user().await?;
        let body = self.update_body(category)?;
        let mut rows: Vec<Category> = self
            .client
            .update("categories", "*", category.id, user.id, &body)
            .await?;
        rows.pop()
            .ok_or_else(|| not_found_error("Category", &category.id.to_string()))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let user = self.client.require_user().await?;

        // Una categoría referenciada por rutas no puede eliminarse
        let referencing: Vec<RouteOwnerProbe> = self
            .client
            .select(
                "routes",
                &[
                    ("select", "id,user_id".to_string()),
                    ("category_id", format!("eq.{}", id)),
                    ("user_id", format!("eq.{}", user.id)),
                ],
            )
            .await?;
        if !referencing.is_empty() {
            return Err(AppError::Conflict(
                "Cannot delete category that is being used by routes. Please reassign or delete the routes first."
                    .to_string(),
            ));
        }

        self.client.delete("categories", id, user.id).await
    }

    // ==================== Assignments ====================

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>> {
        let user = self.client.require_user().await?;
        self.client
            .select(
                "assignments",
                &[
                    ("select", ASSIGNMENT_SELECT.to_string()),
                    ("user_id", format!("eq.{}", user.id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    async fn add_assignment(&self, request: &CreateAssignmentRequest) -> AppResult<Assignment> {
        let user = self.client.require_user().await?;

        // Restricción un-vehículo-una-asignación: si el estado ocupa el
        // vehículo, rechazar cuando ya exista otra asignación ocupante
        if request.status.is_occupying() {
            if let Some(vehicle_id) = request.vehicle_id {
                let existing: Vec<AssignmentProbe> = self
                    .client
                    .select(
                        "assignments",
                        &[
                            ("select", "id".to_string()),
                            ("vehicle_id", format!("eq.{}", vehicle_id)),
                            (
                                "status",
                                format!("in.({})", AssignmentStatus::occupying_values().join(",")),
                            ),
                            ("user_id", format!("eq.{}", user.id)),
                        ],
                    )
                    .await?;
                if !existing.is_empty() {
                    return Err(AppError::Conflict(
                        "This vehicle is already assigned to an active assignment. Please choose a different vehicle or complete the existing assignment first."
                            .to_string(),
                    ));
                }
            }
        }

        let body = self.scoped_body(request, user.id)?;
        log::info!("📝 Creando asignación para el usuario {}", user.id);
        self.client.insert("assignments", ASSIGNMENT_SELECT, &body).await
    }

    async fn update_assignment(&self, assignment: &Assignment) -> AppResult<Assignment> {
        let user = self.client.require_user().await?;
        let body = self.update_body(assignment)?;
        let mut rows: Vec<Assignment> = self
            .client
            .update(
                "assignments",
                ASSIGNMENT_SELECT,
                assignment.id,
                user.id,
                &body,
            )
            .await?;
        rows.pop()
            .ok_or_else(|| not_found_error("Assignment", &assignment.id.to_string()))
    }

    async fn delete_assignment(&self, id: Uuid) -> AppResult<()> {
        let user = self.client.require_user().await?;
        self.client.delete("assignments", id, user.id).await
    }

    async fn get_assignments_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Assignment>> {
        let user = self.client.require_user().await?;
        self.client
            .select(
                "assignments",
                &[
                    ("select", ASSIGNMENT_SELECT.to_string()),
                    ("driver_id", format!("eq.{}", driver_id)),
                    ("user_id", format!("eq.{}", user.id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    async fn get_active_assignments(&self) -> AppResult<Vec<Assignment>> {
        let user = self.client.require_user().await?;
        self.client
            .select(
                "assignments",
                &[
                    ("select", ASSIGNMENT_SELECT.to_string()),
                    (
                        "status",
                        format!("in.({})", AssignmentStatus::occupying_values().join(",")),
                    ),
                    ("user_id", format!("eq.{}", user.id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }
}

/// Proyección mínima para chequeos de existencia y pertenencia
#[derive(Debug, serde::Deserialize)]
struct RouteOwnerProbe {
    #[allow(dead_code)]
    id: Uuid,
    user_id: Uuid,
}

#[derive(Debug, serde::Deserialize)]
struct AssignmentProbe {
    #[allow(dead_code)]
    id: Uuid,
}
