//! Servicio de autenticación
//!
//! Este módulo define el trait AuthProvider (la interfaz que consume el
//! session gate), su implementación de producción AuthService y la
//! clasificación de errores de login en mensajes para el usuario.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::client::SupabaseClient;
use crate::models::{AuthChangeEvent, Session, User};
use crate::utils::errors::{AppError, AppResult};

/// Notificación de cambio de sesión empujada por el servicio remoto
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

/// Interfaz de autenticación tal como la consume el session gate
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Usuario de la sesión existente, validado contra el servidor
    async fn get_current_user(&self) -> AppResult<Option<User>>;
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<User>;
    async fn sign_out(&self) -> AppResult<()>;
    /// Suscripción a las notificaciones de cambio de sesión
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

/// Implementación de producción de AuthProvider sobre SupabaseClient
pub struct AuthService {
    client: SupabaseClient,
    events: broadcast::Sender<SessionChange>,
}

impl AuthService {
    pub fn new(client: SupabaseClient) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { client, events }
    }

    fn notify(&self, event: AuthChangeEvent, session: Option<Session>) {
        // Sin suscriptores no es un error
        let _ = self.events.send(SessionChange { event, session });
    }
}

#[async_trait]
impl AuthProvider for AuthService {
    async fn get_current_user(&self) -> AppResult<Option<User>> {
        self.client.get_user().await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = self.client.sign_in(email, password).await?;
        log::info!("✅ Sesión iniciada para {}", email);
        self.notify(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self.client.sign_up(email, password).await?;
        if let Some(session) = self.client.current_session().await {
            self.notify(AuthChangeEvent::SignedIn, Some(session));
        }
        Ok(user)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let result = self.client.sign_out().await;
        if let Err(err) = &result {
            log::warn!("⚠️ Error cerrando sesión remota: {}", err);
        }
        // La sesión local ya quedó limpia; notificar siempre
        self.notify(AuthChangeEvent::SignedOut, None);
        result
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}

/// Clasificar un error de login en un mensaje para el usuario.
/// Se inspecciona primero el código del servidor y después el texto.
pub fn login_error_message(error: &AppError) -> String {
    let (code, message) = match error {
        AppError::Auth { code, message } => (code.as_deref(), message.as_str()),
        other => {
            return other.user_message();
        }
    };
    let lowered = message.to_lowercase();

    if code == Some("email_not_confirmed") || lowered.contains("email not confirmed") {
        return "Please check your email and click the confirmation link before signing in. If you don't see the email, check your spam folder."
            .to_string();
    }
    if code == Some("invalid_credentials")
        || lowered.contains("invalid login credentials")
        || lowered.contains("invalid_credentials")
    {
        return "Invalid email or password. Please check your credentials and try again."
            .to_string();
    }
    if lowered.contains("too many requests") || lowered.contains("rate limit") {
        return "Too many login attempts. Please wait a few minutes before trying again."
            .to_string();
    }

    message.to_string()
}
