//! Cliente HTTP para el store remoto (API REST + API Auth)
//!
//! Este módulo contiene el cliente HTTP de bajo nivel contra el backend
//! hosteado: el API de datos (PostgREST) y el API de autenticación (GoTrue).
//! Los servicios de más arriba componen sobre estas primitivas; aquí solo se
//! habla HTTP y se clasifican los status codes en AppError.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::models::{Session, User};
use crate::utils::errors::{internal_error, AppError, AppResult};

/// Cliente HTTP para el backend remoto
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_base: String,
    auth_base: String,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
}

impl SupabaseClient {
    /// Crear nuevo cliente con la configuración del entorno
    pub fn new(config: &EnvironmentConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            rest_base: config.rest_url(),
            auth_base: config.auth_url(),
            anon_key: config.supabase_anon_key.clone(),
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Sesión activa (si la hay)
    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Usuario de la sesión activa (si la hay)
    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Usuario actual, o Unauthorized si no hay sesión
    pub async fn require_user(&self) -> AppResult<User> {
        self.current_user()
            .await
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
    }

    /// Reemplazar la sesión almacenada (None la limpia)
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    async fn bearer_token(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.anon_key.clone())
            .bearer_auth(self.bearer_token().await)
    }

    // ==================== API REST (datos) ====================

    /// SELECT sobre una tabla. `query` lleva los filtros PostgREST ya
    /// formados (p.ej. ("user_id", "eq.<uuid>"), ("order", "created_at.desc")).
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let url = format!("{}/{}", self.rest_base, table);
        let request = self.with_auth(self.http.get(&url).query(query)).await;
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(rest_error(response).await);
        }
        Ok(response.json::<Vec<T>>().await?)
    }

    /// INSERT de una fila; devuelve la fila confirmada por el servidor.
    /// `select_clause` controla qué devuelve el representation (p.ej. "*"
    /// o un select con relaciones incrustadas).
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        select_clause: &str,
        body: &Value,
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.rest_base, table);
        let request = self
            .with_auth(
                self.http
                    .post(&url)
                    .query(&[("select", select_clause)])
                    .header("Prefer", "return=representation")
                    .json(body),
            )
            .await;
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(rest_error(response).await);
        }

        let mut rows = response.json::<Vec<T>>().await?;
        if rows.is_empty() {
            return Err(internal_error(&format!(
                "Insert into '{}' returned no rows",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    /// UPDATE por id con scope de usuario. Devuelve las filas afectadas;
    /// una lista vacía significa que ningún registro matcheó los filtros.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        select_clause: &str,
        id: Uuid,
        user_id: Uuid,
        body: &Value,
    ) -> AppResult<Vec<T>> {
        let url = format!("{}/{}", self.rest_base, table);
        let request = self
            .with_auth(
                self.http
                    .patch(&url)
                    .query(&[
                        ("id", format!("eq.{}", id)),
                        ("user_id", format!("eq.{}", user_id)),
                        ("select", select_clause.to_string()),
                    ])
                    .header("Prefer", "return=representation")
                    .json(body),
            )
            .await;
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(rest_error(response).await);
        }
        Ok(response.json::<Vec<T>>().await?)
    }

    /// DELETE por id con scope de usuario
    pub async fn delete(&self, table: &str, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let url = format!("{}/{}", self.rest_base, table);
        let request = self
            .with_auth(self.http.delete(&url).query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user_id)),
            ]))
            .await;
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(rest_error(response).await);
        }
        Ok(())
    }

    // ==================== API Auth ====================

    /// Iniciar sesión con email y password; almacena la sesión en el cliente
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let url = format!("{}/token", self.auth_base);
        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", self.anon_key.clone())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let session = response.json::<Session>().await?;
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Registrar un usuario nuevo. Si el servidor devuelve sesión (auto
    /// confirmación) queda almacenada; si requiere confirmación por email
    /// solo devuelve el usuario.
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<User> {
        let url = format!("{}/signup", self.auth_base);
        let response = self
            .http
            .post(&url)
            .header("apikey", self.anon_key.clone())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let body = response.json::<Value>().await?;
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| internal_error(&format!("Invalid session payload: {}", e)))?;
            let user = session.user.clone();
            self.set_session(Some(session)).await;
            return Ok(user);
        }

        let user_value = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user_value)
            .map_err(|e| internal_error(&format!("Invalid user payload: {}", e)))
    }

    /// Cerrar sesión remota. La sesión local se limpia siempre, falle o no
    /// la llamada remota.
    pub async fn sign_out(&self) -> AppResult<()> {
        let token = {
            let guard = self.session.read().await;
            guard.as_ref().map(|s| s.access_token.clone())
        };
        self.set_session(None).await;

        let Some(token) = token else {
            return Ok(());
        };

        let url = format!("{}/logout", self.auth_base);
        let response = self
            .http
            .post(&url)
            .header("apikey", self.anon_key.clone())
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }
        Ok(())
    }

    /// Consultar el usuario de la sesión actual contra el servidor.
    /// Devuelve None si no hay sesión o si el token ya no es válido.
    pub async fn get_user(&self) -> AppResult<Option<User>> {
        let Some(session) = self.current_session().await else {
            return Ok(None);
        };

        let url = format!("{}/user", self.auth_base);
        let response = self
            .http
            .get(&url)
            .header("apikey", self.anon_key.clone())
            .bearer_auth(session.access_token)
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            // Token vencido o revocado: la sesión local deja de ser válida
            self.set_session(None).await;
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(auth_error(response).await);
        }

        let user = response.json::<User>().await?;
        Ok(Some(user))
    }
}

/// Cuerpo de error que devuelven ambos APIs (las claves varían según endpoint)
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

impl ErrorBody {
    fn best_message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    fn best_code(&self) -> Option<String> {
        self.error_code.clone().or_else(|| match &self.code {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
    }
}

/// Clasificar una respuesta fallida del API de datos
async fn rest_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.best_message())
        .unwrap_or_else(|| "unknown error".to_string());

    match status {
        401 => AppError::Unauthorized(body),
        403 => AppError::Forbidden(body),
        404 | 406 => AppError::NotFound(body),
        409 => AppError::Conflict(body),
        _ => AppError::Api {
            status,
            message: body,
        },
    }
}

/// Clasificar una respuesta fallida del API de autenticación conservando
/// el código de error del servidor para la clasificación de mensajes
async fn auth_error(response: Response) -> AppError {
    let body = response.json::<ErrorBody>().await.ok();
    let (code, message) = match body {
        Some(b) => (
            b.best_code(),
            b.best_message()
                .unwrap_or_else(|| "unknown authentication error".to_string()),
        ),
        None => (None, "unknown authentication error".to_string()),
    };
    AppError::Auth { code, message }
}
