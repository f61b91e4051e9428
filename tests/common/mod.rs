//! Dobles de test: store en memoria con la semántica del servidor y
//! proveedor de autenticación configurable.

// Cada binario de test usa un subconjunto de los helpers
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use fleet_management::models::{
    Assignment, AssignmentStatus, Category, CreateAssignmentRequest, CreateCategoryRequest,
    CreateDriverRequest, CreateRouteRequest, CreateVehicleRequest, Driver, DriverStatus, Route,
    RouteType, Session, User, Vehicle, VehicleStatus, VehicleType,
};
use fleet_management::services::{AuthProvider, RemoteStore, SessionChange};
use fleet_management::{AppError, AppResult};

/// Usuario fijo dueño de todos los registros de test
pub fn test_user_id() -> Uuid {
    Uuid::from_u128(1)
}

pub fn test_user() -> User {
    User {
        id: test_user_id(),
        email: Some("owner@example.com".to_string()),
        created_at: None,
    }
}

// ==================== Builders de entidades ====================

pub fn sample_driver(first_name: &str) -> Driver {
    Driver {
        id: Uuid::new_v4(),
        user_id: test_user_id(),
        first_name: first_name.to_string(),
        last_name: "Smith".to_string(),
        license_number: "D1234567".to_string(),
        license_expiry: None,
        dot_number: None,
        dot_expiry: None,
        phone: "5551234567".to_string(),
        email: None,
        address: None,
        emergency_contact: None,
        emergency_phone: None,
        status: DriverStatus::Active,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn sample_vehicle(vehicle_number: &str) -> Vehicle {
    Vehicle {
        id: Uuid::new_v4(),
        user_id: test_user_id(),
        vehicle_number: vehicle_number.to_string(),
        vehicle_type: VehicleType::Bus,
        make: None,
        model: None,
        year: Some(2020),
        license_plate: None,
        status: VehicleStatus::Available,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn sample_route(route_name: &str, route_type: RouteType, category_id: Option<Uuid>) -> Route {
    Route {
        id: Uuid::new_v4(),
        user_id: test_user_id(),
        route_name: route_name.to_string(),
        route_number: None,
        route_type,
        category_id,
        check_in_time: None,
        school_name: None,
        stops: None,
        distance: None,
        estimated_time: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn sample_category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        user_id: test_user_id(),
        name: name.to_string(),
        description: None,
        color: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn sample_assignment(
    driver_id: Uuid,
    vehicle_id: Option<Uuid>,
    route_id: Option<Uuid>,
    status: AssignmentStatus,
) -> Assignment {
    Assignment {
        id: Uuid::new_v4(),
        user_id: test_user_id(),
        driver_id,
        vehicle_id,
        route_id,
        status,
        notes: None,
        created_at: Utc::now(),
        updated_at: None,
        driver: None,
        vehicle: None,
        route: None,
    }
}

pub fn driver_request(first_name: &str) -> CreateDriverRequest {
    CreateDriverRequest {
        first_name: first_name.to_string(),
        last_name: "Smith".to_string(),
        license_number: "D1234567".to_string(),
        license_expiry: None,
        dot_number: None,
        dot_expiry: None,
        phone: "5551234567".to_string(),
        email: None,
        address: None,
        emergency_contact: None,
        emergency_phone: None,
        status: DriverStatus::Active,
        notes: None,
    }
}

pub fn assignment_request(
    driver_id: Uuid,
    vehicle_id: Option<Uuid>,
    route_id: Option<Uuid>,
    status: AssignmentStatus,
) -> CreateAssignmentRequest {
    CreateAssignmentRequest {
        driver_id,
        vehicle_id,
        route_id,
        status,
        notes: None,
    }
}

// ==================== Store en memoria ====================

#[derive(Default)]
struct StoreInner {
    drivers: Vec<Driver>,
    vehicles: Vec<Vehicle>,
    routes: Vec<Route>,
    assignments: Vec<Assignment>,
    categories: Vec<Category>,
    fail_drivers: bool,
    fail_vehicles: bool,
    fail_routes: bool,
    fail_assignments: bool,
    fail_categories: bool,
    // Inserts de ruta que quedan por aceptar antes de empezar a fallar
    routes_ok_budget: Option<usize>,
}

/// RemoteStore en memoria que replica la semántica observable del servidor:
/// chequeo de ocupación de vehículo, guard de categoría referenciada, nombre
/// de categoría único e incrustación de relaciones en las asignaciones.
/// Cada colección tiene un switch de fallo para simular errores remotos.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_driver(&self, driver: Driver) {
        self.inner.lock().unwrap().drivers.push(driver);
    }

    pub fn seed_vehicle(&self, vehicle: Vehicle) {
        self.inner.lock().unwrap().vehicles.push(vehicle);
    }

    pub fn seed_route(&self, route: Route) {
        self.inner.lock().unwrap().routes.push(route);
    }

    pub fn seed_category(&self, category: Category) {
        self.inner.lock().unwrap().categories.push(category);
    }

    pub fn seed_assignment(&self, assignment: Assignment) {
        self.inner.lock().unwrap().assignments.push(assignment);
    }

    pub fn set_fail_drivers(&self, fail: bool) {
        self.inner.lock().unwrap().fail_drivers = fail;
    }

    pub fn set_fail_routes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_routes = fail;
    }

    pub fn set_fail_categories(&self, fail: bool) {
        self.inner.lock().unwrap().fail_categories = fail;
    }

    /// Acepta `n` inserts de ruta más y falla los siguientes
    pub fn set_routes_ok_budget(&self, n: usize) {
        self.inner.lock().unwrap().routes_ok_budget = Some(n);
    }

    pub fn route_count(&self) -> usize {
        self.inner.lock().unwrap().routes.len()
    }

    pub fn category_count(&self) -> usize {
        self.inner.lock().unwrap().categories.len()
    }

    pub fn assignment_count(&self) -> usize {
        self.inner.lock().unwrap().assignments.len()
    }

    fn remote_failure() -> AppError {
        AppError::Api {
            status: 500,
            message: "simulated remote failure".to_string(),
        }
    }

    fn embed(inner: &StoreInner, mut assignment: Assignment) -> Assignment {
        assignment.driver = inner
            .drivers
            .iter()
            .find(|d| d.id == assignment.driver_id)
            .cloned();
        assignment.vehicle = assignment
            .vehicle_id
            .and_then(|id| inner.vehicles.iter().find(|v| v.id == id).cloned());
        assignment.route = assignment
            .route_id
            .and_then(|id| inner.routes.iter().find(|r| r.id == id).cloned());
        assignment
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_drivers(&self) -> AppResult<Vec<Driver>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_drivers {
            return Err(Self::remote_failure());
        }
        Ok(inner.drivers.clone())
    }

    async fn add_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_drivers {
            return Err(Self::remote_failure());
        }
        let mut driver = sample_driver(&request.first_name);
        driver.last_name = request.last_name.clone();
        driver.license_number = request.license_number.clone();
        driver.phone = request.phone.clone();
        driver.status = request.status;
        inner.drivers.push(driver.clone());
        Ok(driver)
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_drivers {
            return Err(Self::remote_failure());
        }
        let existing = inner
            .drivers
            .iter_mut()
            .find(|d| d.id == driver.id)
            .ok_or_else(|| AppError::NotFound(format!("Driver with id '{}' not found", driver.id)))?;
        let mut updated = driver.clone();
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_drivers {
            return Err(Self::remote_failure());
        }
        inner.drivers.retain(|d| d.id != id);
        Ok(())
    }

    async fn get_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_vehicles {
            return Err(Self::remote_failure());
        }
        Ok(inner.vehicles.clone())
    }

    async fn add_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_vehicles {
            return Err(Self::remote_failure());
        }
        let mut vehicle = sample_vehicle(&request.vehicle_number);
        vehicle.vehicle_type = request.vehicle_type;
        vehicle.status = request.status;
        inner.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_vehicles {
            return Err(Self::remote_failure());
        }
        let existing = inner
            .vehicles
            .iter_mut()
            .find(|v| v.id == vehicle.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Vehicle with id '{}' not found", vehicle.id))
            })?;
        let mut updated = vehicle.clone();
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_vehicles {
            return Err(Self::remote_failure());
        }
        inner.vehicles.retain(|v| v.id != id);
        Ok(())
    }

    async fn get_routes(&self) -> AppResult<Vec<Route>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_routes {
            return Err(Self::remote_failure());
        }
        Ok(inner.routes.clone())
    }

    async fn add_route(&self, request: &CreateRouteRequest) -> AppResult<Route> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_routes {
            return Err(Self::remote_failure());
        }
        if let Some(budget) = inner.routes_ok_budget.as_mut() {
            if *budget == 0 {
                return Err(Self::remote_failure());
            }
            *budget -= 1;
        }
        let mut route = sample_route(&request.route_name, request.route_type, request.category_id);
        route.route_number = request.route_number.clone();
        route.check_in_time = request.check_in_time.clone();
        route.school_name = request.school_name.clone();
        route.stops = request.stops.clone();
        route.distance = request.distance;
        route.estimated_time = request.estimated_time;
        route.notes = request.notes.clone();
        inner.routes.push(route.clone());
        Ok(route)
    }

    async fn update_route(&self, route: &Route) -> AppResult<Route> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_routes {
            return Err(Self::remote_failure());
        }
        let existing = inner
            .routes
            .iter_mut()
            .find(|r| r.id == route.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Route with id '{}' does not exist", route.id))
            })?;
        let mut updated = route.clone();
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_routes {
            return Err(Self::remote_failure());
        }
        inner.routes.retain(|r| r.id != id);
        Ok(())
    }

    async fn get_categories(&self) -> AppResult<Vec<Category>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_categories {
            return Err(Self::remote_failure());
        }
        let mut categories = inner.categories.clone();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    async fn add_category(&self, request: &CreateCategoryRequest) -> AppResult<Category> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_categories {
            return Err(Self::remote_failure());
        }
        let name = request.name.trim();
        if inner
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
        {
            return Err(AppError::Conflict(format!(
                "A category named '{}' already exists. Please choose a different name.",
                name
            )));
        }
        let mut category = sample_category(name);
        category.description = request.description.clone();
        category.color = request.color.clone();
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, category: &Category) -> AppResult<Category> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_categories {
            return Err(Self::remote_failure());
        }
        let existing = inner
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id '{}' not found", category.id))
            })?;
        let mut updated = category.clone();
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_categories {
            return Err(Self::remote_failure());
        }
        if inner.routes.iter().any(|r| r.category_id == Some(id)) {
            return Err(AppError::Conflict(
                "Cannot delete category that is being used by routes. Please reassign or delete the routes first."
                    .to_string(),
            ));
        }
        inner.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn get_assignments(&self) -> AppResult<Vec<Assignment>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        Ok(inner
            .assignments
            .iter()
            .map(|a| Self::embed(&inner, a.clone()))
            .collect())
    }

    async fn add_assignment(&self, request: &CreateAssignmentRequest) -> AppResult<Assignment> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        if request.status.is_occupying() {
            if let Some(vehicle_id) = request.vehicle_id {
                let occupied = inner
                    .assignments
                    .iter()
                    .any(|a| a.vehicle_id == Some(vehicle_id) && a.status.is_occupying());
                if occupied {
                    return Err(AppError::Conflict(
                        "This vehicle is already assigned to an active assignment. Please choose a different vehicle or complete the existing assignment first."
                            .to_string(),
                    ));
                }
            }
        }
        let assignment = sample_assignment(
            request.driver_id,
            request.vehicle_id,
            request.route_id,
            request.status,
        );
        inner.assignments.push(assignment.clone());
        Ok(Self::embed(&inner, assignment))
    }

    async fn update_assignment(&self, assignment: &Assignment) -> AppResult<Assignment> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        let existing = inner
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Assignment with id '{}' not found", assignment.id))
            })?;
        let mut updated = assignment.clone();
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(Self::embed(&inner, updated))
    }

    async fn delete_assignment(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        inner.assignments.retain(|a| a.id != id);
        Ok(())
    }

    async fn get_assignments_by_driver(&self, driver_id: Uuid) -> AppResult<Vec<Assignment>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        Ok(inner
            .assignments
            .iter()
            .filter(|a| a.driver_id == driver_id)
            .map(|a| Self::embed(&inner, a.clone()))
            .collect())
    }

    async fn get_active_assignments(&self) -> AppResult<Vec<Assignment>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_assignments {
            return Err(Self::remote_failure());
        }
        Ok(inner
            .assignments
            .iter()
            .filter(|a| a.status.is_occupying())
            .map(|a| Self::embed(&inner, a.clone()))
            .collect())
    }
}

// ==================== Proveedor de autenticación ====================

struct AuthInner {
    current_user: Option<User>,
    // (code, message) del error a devolver en el próximo sign_in
    sign_in_error: Option<(Option<String>, String)>,
    fail_sign_out: bool,
}

/// AuthProvider configurable para los tests del session gate
pub struct MockAuth {
    inner: Mutex<AuthInner>,
    events: broadcast::Sender<SessionChange>,
}

impl MockAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Mutex::new(AuthInner {
                current_user: None,
                sign_in_error: None,
                fail_sign_out: false,
            }),
            events,
        }
    }

    pub fn with_existing_session() -> Self {
        let auth = Self::new();
        auth.inner.lock().unwrap().current_user = Some(test_user());
        auth
    }

    pub fn set_sign_in_error(&self, code: Option<&str>, message: &str) {
        self.inner.lock().unwrap().sign_in_error =
            Some((code.map(str::to_string), message.to_string()));
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.inner.lock().unwrap().fail_sign_out = fail;
    }

    fn session_for(user: User) -> Session {
        Session {
            access_token: "test-token".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user,
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn get_current_user(&self) -> AppResult<Option<User>> {
        Ok(self.inner.lock().unwrap().current_user.clone())
    }

    async fn sign_in(&self, email: &str, _password: &str) -> AppResult<Session> {
        let mut inner = self.inner.lock().unwrap();
        if let Some((code, message)) = inner.sign_in_error.clone() {
            return Err(AppError::Auth { code, message });
        }
        let user = User {
            id: test_user_id(),
            email: Some(email.to_string()),
            created_at: None,
        };
        inner.current_user = Some(user.clone());
        Ok(Self::session_for(user))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            created_at: None,
        };
        self.inner.lock().unwrap().current_user = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.current_user = None;
        if inner.fail_sign_out {
            return Err(AppError::Api {
                status: 503,
                message: "logout endpoint unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}
