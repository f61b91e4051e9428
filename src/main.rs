use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};

use fleet_management::config::EnvironmentConfig;
use fleet_management::client::SupabaseClient;
use fleet_management::services::{AuthService, DatabaseService, RemoteStore};
use fleet_management::session::SessionGate;
use fleet_management::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚍 Fleet Management - Núcleo de dominio");
    info!("=======================================");

    let config = EnvironmentConfig::default();
    info!("🌐 Backend remoto: {}", config.supabase_url);

    let client = match SupabaseClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Error creando el cliente HTTP: {}", e);
            return Err(anyhow::anyhow!("Error de cliente: {}", e));
        }
    };

    let store = Arc::new(DatabaseService::new(client.clone()));
    let auth = Arc::new(AuthService::new(client));

    let mut app = AppState::new(Arc::clone(&store) as Arc<dyn RemoteStore>);
    let mut gate = SessionGate::new(auth);

    // Comprobar sesión existente; si la hay se cargan las cinco colecciones
    gate.initialize(&mut app).await;

    if !gate.is_authenticated() {
        let email = std::env::var("FLEET_EMAIL").ok();
        let password = std::env::var("FLEET_PASSWORD").ok();

        match (email, password) {
            (Some(email), Some(password)) => {
                info!("🔑 Iniciando sesión como {}", email);
                let outcome = gate.sign_in(&mut app, &email, &password).await;
                if !outcome.success {
                    error!(
                        "❌ Login fallido: {}",
                        outcome.error.unwrap_or_else(|| "unknown error".to_string())
                    );
                    return Ok(());
                }
            }
            _ => {
                warn!("⚠️ Sin sesión previa y sin FLEET_EMAIL/FLEET_PASSWORD; nada que hacer");
                return Ok(());
            }
        }
    }

    info!("📊 Resumen de la flota:");
    info!("   👤 Conductores: {}", app.drivers.len());
    info!("   🚌 Vehículos:   {}", app.vehicles.len());
    info!("   🗺️ Rutas:       {}", app.routes.len());
    info!("   📝 Asignaciones: {}", app.assignments.len());
    info!("   🏷️ Categorías:  {}", app.categories.len());

    for assignment in &app.assignments {
        info!(
            "   📌 Asignación {} → categoría '{}'",
            assignment.id,
            app.category_info(assignment.id)
        );
    }

    match store.get_active_assignments().await {
        Ok(active) => info!("🚦 Vehículos ocupados por asignaciones activas: {}", active.len()),
        Err(e) => warn!("⚠️ No se pudieron leer las asignaciones activas: {}", e),
    }

    for driver in &app.drivers {
        match store.get_assignments_by_driver(driver.id).await {
            Ok(history) => info!(
                "   👤 {}: {} asignaciones en el historial",
                driver.full_name(),
                history.len()
            ),
            Err(e) => warn!(
                "⚠️ No se pudo leer el historial de {}: {}",
                driver.full_name(),
                e
            ),
        }
    }

    gate.sign_out(&mut app).await;
    info!("👋 Sesión cerrada");
    Ok(())
}
