//! Session gate
//!
//! Este módulo controla el ciclo de vida de la sesión autenticada y dispara
//! la carga o el vaciado del contenedor de estado en cada transición.
//! `sign_in` nunca lanza: devuelve un resultado con el mensaje clasificado
//! para mostrar al usuario.

use std::sync::Arc;

use crate::models::{AuthChangeEvent, Session, User};
use crate::services::{login_error_message, AuthProvider};
use crate::state::AppState;

/// Estado de la sesión. Arranca en Authenticating mientras se comprueba si
/// existe una sesión previa.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Authenticating,
    Unauthenticated,
    Authenticated(User),
}

/// Resultado no-lanzante de sign_in / sign_up
#[derive(Debug, Clone, PartialEq)]
pub struct SignInOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SignInOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

/// Gate de autenticación sobre un AuthProvider
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    status: SessionStatus,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            status: SessionStatus::Authenticating,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated(_))
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.status {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Comprueba si existe una sesión previa y transiciona en consecuencia.
    /// Entrar autenticado dispara la carga completa; lo contrario vacía el
    /// contenedor.
    pub async fn initialize(&mut self, app: &mut AppState) {
        match self.auth.get_current_user().await {
            Ok(Some(user)) => {
                log::info!("🔐 Sesión existente para {}", user.id);
                self.enter_authenticated(app, user).await;
            }
            Ok(None) => {
                self.enter_unauthenticated(app);
            }
            Err(err) => {
                log::warn!("⚠️ No se pudo comprobar la sesión existente: {}", err);
                self.enter_unauthenticated(app);
            }
        }
    }

    /// Intenta iniciar sesión. En fallo permanece sin autenticar y devuelve
    /// el mensaje clasificado; nunca propaga el error crudo.
    pub async fn sign_in(
        &mut self,
        app: &mut AppState,
        email: &str,
        password: &str,
    ) -> SignInOutcome {
        match self.auth.sign_in(email, password).await {
            Ok(session) => {
                self.enter_authenticated(app, session.user).await;
                SignInOutcome::ok()
            }
            Err(err) => {
                log::warn!("❌ Login fallido para {}: {}", email, err);
                SignInOutcome::failed(login_error_message(&err))
            }
        }
    }

    /// Registra un usuario nuevo. El mensaje de error viaja crudo (sin
    /// clasificación de login).
    pub async fn sign_up(
        &mut self,
        app: &mut AppState,
        email: &str,
        password: &str,
    ) -> SignInOutcome {
        match self.auth.sign_up(email, password).await {
            Ok(user) => {
                self.enter_authenticated(app, user).await;
                SignInOutcome::ok()
            }
            Err(err) => SignInOutcome::failed(err.user_message()),
        }
    }

    /// Cierra la sesión. La transición local y el vaciado del contenedor
    /// ocurren incondicionalmente, falle o no la llamada remota.
    pub async fn sign_out(&mut self, app: &mut AppState) {
        if let Err(err) = self.auth.sign_out().await {
            log::warn!("⚠️ Cierre de sesión remoto falló: {}", err);
        }
        self.enter_unauthenticated(app);
    }

    /// Aplica una notificación externa de cambio de sesión (refresh de token,
    /// sign-out desde otro dispositivo) con la misma lógica de transición.
    pub async fn apply_event(
        &mut self,
        app: &mut AppState,
        event: AuthChangeEvent,
        session: Option<Session>,
    ) {
        log::info!("🔄 Evento de sesión: {}", event.as_str());
        match session {
            Some(session) => {
                let already_same_user = self
                    .current_user()
                    .map_or(false, |user| user.id == session.user.id);
                if already_same_user {
                    // Refresh del mismo usuario: no recargar
                    self.status = SessionStatus::Authenticated(session.user);
                } else {
                    self.enter_authenticated(app, session.user).await;
                }
            }
            None => self.enter_unauthenticated(app),
        }
    }

    async fn enter_authenticated(&mut self, app: &mut AppState, user: User) {
        self.status = SessionStatus::Authenticated(user);
        if let Err(err) = app.load_all().await {
            // El error ya quedó reflejado en el estado; la sesión sigue válida
            log::warn!("⚠️ Carga inicial fallida: {}", err);
        }
    }

    fn enter_unauthenticated(&mut self, app: &mut AppState) {
        self.status = SessionStatus::Unauthenticated;
        app.clear_all();
    }
}
