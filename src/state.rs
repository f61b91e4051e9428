//! Estado compartido de la aplicación
//!
//! Este módulo define el contenedor de estado de dominio: las cinco
//! colecciones de entidades, el filtro de categoría activo y las operaciones
//! de mutación contra el store remoto. Ninguna mutación es optimista: la
//! memoria solo cambia con el resultado confirmado por el servidor. Las
//! vistas derivadas son funciones puras recalculadas en cada llamada.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Assignment, Category, CreateAssignmentRequest, CreateCategoryRequest, CreateDriverRequest,
    CreateRoutePairRequest, CreateRouteRequest, CreateVehicleRequest, Driver, Route, Vehicle,
};
use crate::services::RemoteStore;
use crate::utils::errors::AppResult;

/// Sentinel para asignaciones sin categoría resoluble
pub const NO_CATEGORY: &str = "No Category";

/// Contenedor de estado de dominio
pub struct AppState {
    store: Arc<dyn RemoteStore>,
    pub drivers: Vec<Driver>,
    pub vehicles: Vec<Vehicle>,
    pub routes: Vec<Route>,
    /// Las asignaciones se mantienen más recientes primero
    pub assignments: Vec<Assignment>,
    pub categories: Vec<Category>,
    /// Filtro de categoría activo (None = sin filtro)
    pub selected_category: Option<Uuid>,
    /// Flag de ocupado simple, last-writer-wins entre operaciones solapadas
    pub loading: bool,
    /// Último error, visible para observadores pasivos
    pub error: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            drivers: Vec::new(),
            vehicles: Vec::new(),
            routes: Vec::new(),
            assignments: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            loading: false,
            error: None,
        }
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Cierre garantizado de toda operación: limpia el flag de ocupado y
    /// refleja el error (si lo hay) antes de propagarlo al caller
    fn settle<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.user_message());
        }
        result
    }

    // ==================== Carga inicial ====================

    /// Carga las cinco colecciones en paralelo, todo-o-nada: si cualquier
    /// fetch falla, ninguna colección cambia respecto de su valor previo.
    pub async fn load_all(&mut self) -> AppResult<()> {
        self.begin();
        let store = Arc::clone(&self.store);
        let result = futures::try_join!(
            store.get_drivers(),
            store.get_vehicles(),
            store.get_routes(),
            store.get_assignments(),
            store.get_categories(),
        );

        let (drivers, vehicles, routes, assignments, categories) = self.settle(result)?;
        self.drivers = drivers;
        self.vehicles = vehicles;
        self.routes = routes;
        self.assignments = assignments;
        self.categories = categories;
        log::info!(
            "📦 Datos cargados: {} conductores, {} vehículos, {} rutas, {} asignaciones, {} categorías",
            self.drivers.len(),
            self.vehicles.len(),
            self.routes.len(),
            self.assignments.len(),
            self.categories.len()
        );
        Ok(())
    }

    /// Vacía las cinco colecciones y el filtro sin tocar la red (sign-out)
    pub fn clear_all(&mut self) {
        self.drivers.clear();
        self.vehicles.clear();
        self.routes.clear();
        self.assignments.clear();
        self.categories.clear();
        self.selected_category = None;
        self.error = None;
    }

    // ==================== Drivers ====================

    pub async fn add_driver(&mut self, request: CreateDriverRequest) -> AppResult<Driver> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let result = self.store.add_driver(&request).await;
        let driver = self.settle(result)?;
        self.drivers.push(driver.clone());
        Ok(driver)
    }

    pub async fn update_driver(&mut self, driver: Driver) -> AppResult<Driver> {
        self.begin();
        let result = self.store.update_driver(&driver).await;
        let updated = self.settle(result)?;
        replace_by_id(&mut self.drivers, |d| d.id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_driver(&mut self, id: Uuid) -> AppResult<()> {
        self.begin();
        let result = self.store.delete_driver(id).await;
        self.settle(result)?;
        self.drivers.retain(|d| d.id != id);
        Ok(())
    }

    // ==================== Vehicles ====================

    pub async fn add_vehicle(&mut self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let result = self.store.add_vehicle(&request).await;
        let vehicle = self.settle(result)?;
        self.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    pub async fn update_vehicle(&mut self, vehicle: Vehicle) -> AppResult<Vehicle> {
        self.begin();
        let result = self.store.update_vehicle(&vehicle).await;
        let updated = self.settle(result)?;
        replace_by_id(&mut self.vehicles, |v| v.id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_vehicle(&mut self, id: Uuid) -> AppResult<()> {
        self.begin();
        let result = self.store.delete_vehicle(id).await;
        self.settle(result)?;
        self.vehicles.retain(|v| v.id != id);
        Ok(())
    }

    // ==================== Routes ====================

    pub async fn add_route(&mut self, request: CreateRouteRequest) -> AppResult<Route> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let result = self.store.add_route(&request).await;
        let route = self.settle(result)?;
        self.routes.push(route.clone());
        Ok(route)
    }

    /// Crea el par AM/PM de una ruta a partir de un solo formulario.
    /// Los dos inserts son secuenciales (AM se espera antes de emitir PM).
    /// Si PM falla, la fila AM ya confirmada queda creada: el par parcial
    /// no se revierte.
    pub async fn add_route_pair(
        &mut self,
        request: CreateRoutePairRequest,
    ) -> AppResult<(Route, Route)> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let (am_request, pm_request) = request.into_requests();

        let am = match self.store.add_route(&am_request).await {
            Ok(route) => {
                self.routes.push(route.clone());
                route
            }
            Err(err) => return self.settle(Err(err)),
        };

        let pm_result = self.store.add_route(&pm_request).await;
        let pm = self.settle(pm_result)?;
        self.routes.push(pm.clone());
        Ok((am, pm))
    }

    pub async fn update_route(&mut self, route: Route) -> AppResult<Route> {
        self.begin();
        let result = self.store.update_route(&route).await;
        let updated = self.settle(result)?;
        replace_by_id(&mut self.routes, |r| r.id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_route(&mut self, id: Uuid) -> AppResult<()> {
        self.begin();
        let result = self.store.delete_route(id).await;
        self.settle(result)?;
        self.routes.retain(|r| r.id != id);
        Ok(())
    }

    // ==================== Categories ====================

    pub async fn add_category(&mut self, request: CreateCategoryRequest) -> AppResult<Category> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let result = self.store.add_category(&request).await;
        let category = self.settle(result)?;
        self.categories.push(category.clone());
        Ok(category)
    }

    pub async fn update_category(&mut self, category: Category) -> AppResult<Category> {
        self.begin();
        let result = self.store.update_category(&category).await;
        let updated = self.settle(result)?;
        replace_by_id(&mut self.categories, |c| c.id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_category(&mut self, id: Uuid) -> AppResult<()> {
        self.begin();
        let result = self.store.delete_category(id).await;
        self.settle(result)?;
        self.categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Cambia el filtro de categoría activo. Operación puramente local.
    pub fn set_selected_category(&mut self, category_id: Option<Uuid>) {
        self.selected_category = category_id;
    }

    // ==================== Assignments ====================

    pub async fn add_assignment(
        &mut self,
        request: CreateAssignmentRequest,
    ) -> AppResult<Assignment> {
        if let Err(err) = request.validate() {
            return self.settle(Err(err.into()));
        }
        self.begin();
        let result = self.store.add_assignment(&request).await;
        let assignment = self.settle(result)?;
        // Las asignaciones nuevas van al frente (más recientes primero)
        self.assignments.insert(0, assignment.clone());
        Ok(assignment)
    }

    pub async fn update_assignment(&mut self, assignment: Assignment) -> AppResult<Assignment> {
        self.begin();
        let result = self.store.update_assignment(&assignment).await;
        let updated = self.settle(result)?;
        replace_by_id(&mut self.assignments, |a| a.id, updated.clone());
        Ok(updated)
    }

    pub async fn delete_assignment(&mut self, id: Uuid) -> AppResult<()> {
        self.begin();
        let result = self.store.delete_assignment(id).await;
        self.settle(result)?;
        self.assignments.retain(|a| a.id != id);
        Ok(())
    }

    // ==================== Vistas derivadas ====================

    /// Rutas bajo el filtro de categoría activo (todas si no hay filtro)
    pub fn filtered_routes(&self) -> Vec<&Route> {
        match self.selected_category {
            None => self.routes.iter().collect(),
            Some(category_id) => self
                .routes
                .iter()
                .filter(|route| route.category_id == Some(category_id))
                .collect(),
        }
    }

    /// Asignaciones cuyas rutas caen bajo el filtro activo. Con un filtro
    /// activo, las asignaciones sin ruta quedan excluidas (no pueden
    /// pertenecer a ninguna categoría).
    pub fn filtered_assignments(&self) -> Vec<&Assignment> {
        match self.selected_category {
            None => self.assignments.iter().collect(),
            Some(_) => {
                let route_ids: HashSet<Uuid> =
                    self.filtered_routes().iter().map(|route| route.id).collect();
                self.assignments
                    .iter()
                    .filter(|assignment| {
                        assignment
                            .route_id
                            .map_or(false, |route_id| route_ids.contains(&route_id))
                    })
                    .collect()
            }
        }
    }

    /// Conductores referenciados por las asignaciones filtradas, sin duplicados
    pub fn filtered_drivers(&self) -> Vec<&Driver> {
        match self.selected_category {
            None => self.drivers.iter().collect(),
            Some(_) => {
                let driver_ids: HashSet<Uuid> = self
                    .filtered_assignments()
                    .iter()
                    .map(|assignment| assignment.driver_id)
                    .collect();
                self.drivers
                    .iter()
                    .filter(|driver| driver_ids.contains(&driver.id))
                    .collect()
            }
        }
    }

    /// Vehículos referenciados por las asignaciones filtradas, sin duplicados
    pub fn filtered_vehicles(&self) -> Vec<&Vehicle> {
        match self.selected_category {
            None => self.vehicles.iter().collect(),
            Some(_) => {
                let vehicle_ids: HashSet<Uuid> = self
                    .filtered_assignments()
                    .iter()
                    .filter_map(|assignment| assignment.vehicle_id)
                    .collect();
                self.vehicles
                    .iter()
                    .filter(|vehicle| vehicle_ids.contains(&vehicle.id))
                    .collect()
            }
        }
    }

    /// Nombre de la categoría de una asignación, resuelto transitivamente
    /// vía su ruta. Cualquier eslabón roto devuelve el sentinel, nunca falla.
    pub fn category_info(&self, assignment_id: Uuid) -> String {
        let Some(assignment) = self.assignments.iter().find(|a| a.id == assignment_id) else {
            return NO_CATEGORY.to_string();
        };
        let Some(route_id) = assignment.route_id else {
            return NO_CATEGORY.to_string();
        };
        let Some(route) = self.routes.iter().find(|r| r.id == route_id) else {
            return NO_CATEGORY.to_string();
        };
        let Some(category_id) = route.category_id else {
            return NO_CATEGORY.to_string();
        };
        match self.categories.iter().find(|c| c.id == category_id) {
            Some(category) => category.name.clone(),
            None => NO_CATEGORY.to_string(),
        }
    }
}

/// Reemplaza in-place el elemento cuyo id coincide; el resto de la colección
/// no se toca
fn replace_by_id<T, F: Fn(&T) -> Uuid>(items: &mut [T], id_of: F, updated: T) {
    if let Some(existing) = items.iter_mut().find(|item| id_of(item) == id_of(&updated)) {
        *existing = updated;
    }
}
