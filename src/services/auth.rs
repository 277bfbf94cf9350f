use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use super::backend::{error_de_status, normalizar_respuesta, BackendClient};
use super::endpoints::{AUTH_LOGIN, AUTH_ME, AUTH_REFRESH, AUTH_REGISTER};
use crate::api_json::ApiResult;
use crate::errores::ServiceError;
use crate::models::UsuarioSesion;
use crate::sesion::{guardar_sesion, leer_usuario, limpiar_sesion, CLAVE_REFRESH, CLAVE_TOKEN, CLAVE_USUARIO};
use crate::validacion::{validar_login, validar_registro};

#[derive(Debug, Clone, Serialize)]
pub struct RegistroUsuario {
    pub nombre: String,
    pub email: String,
    pub password: String,
}

fn primer_str(v: &Value, claves: &[&str]) -> Option<String> {
    claves.iter().find_map(|k| v.get(*k).and_then(|x| x.as_str()).map(|s| s.to_string()))
}

/// Reduce el usuario que devuelve el backend a lo que se guarda en la sesión.
pub fn minimizar_usuario(v: &Value) -> UsuarioSesion {
    UsuarioSesion {
        id: v.get("id").and_then(|x| x.as_i64()),
        nombre: primer_str(v, &["nombre", "name", "username", "userName"]).unwrap_or_default(),
        email: primer_str(v, &["email", "correo"]).unwrap_or_default(),
        rol: primer_str(v, &["rol", "role"]),
    }
}

fn extraer_tokens(v: &Value) -> Option<(String, Option<String>)> {
    let token = primer_str(v, &["token", "accessToken", "access_token"])?;
    let refresh = primer_str(v, &["refreshToken", "refresh_token"]);
    Some((token, refresh))
}

impl BackendClient {
    /// Pide un nuevo token con el de refresco guardado y lo persiste.
    pub(crate) async fn refrescar_token(&self) -> ApiResult<String> {
        let refresh = self.sesion().get(CLAVE_REFRESH)?.ok_or(ServiceError::SesionExpirada)?;
        let body = json!({ "refreshToken": refresh });
        let (status, cuerpo) = self.enviar_una_vez(Method::POST, AUTH_REFRESH, Some(&body)).await?;
        if !status.is_success() {
            return Err(ServiceError::SesionExpirada);
        }
        let v = normalizar_respuesta(serde_json::from_str(&cuerpo)?)?;
        let (token, nuevo_refresh) = extraer_tokens(&v).ok_or_else(|| ServiceError::Parseo("respuesta de refresh sin token".to_string()))?;
        self.sesion().set(CLAVE_TOKEN, &token)?;
        if let Some(r) = nuevo_refresh {
            self.sesion().set(CLAVE_REFRESH, &r)?;
        }
        Ok(token)
    }
}

/// Operaciones de autenticación sobre el backend (`auth/login`, `register`, `refresh`, `me`).
#[derive(Clone)]
pub struct AuthService {
    client: BackendClient,
}

impl AuthService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, usuario: &str, password: &str) -> ApiResult<UsuarioSesion> {
        validar_login(usuario, password).map_err(ServiceError::Validacion)?;
        let body = json!({ "email": usuario.trim(), "password": password });
        let (status, cuerpo) = self.client.enviar_una_vez(Method::POST, AUTH_LOGIN, Some(&body)).await?;
        if status == StatusCode::UNAUTHORIZED && cuerpo.trim().is_empty() {
            return Err(ServiceError::NoAutorizado);
        }
        if !status.is_success() {
            return Err(error_de_status(status, &cuerpo));
        }

        let v = normalizar_respuesta(serde_json::from_str(&cuerpo)?)?;
        let (token, refresh) = extraer_tokens(&v).ok_or_else(|| ServiceError::Parseo("respuesta de login sin token".to_string()))?;
        let usuario = v.get("user").or_else(|| v.get("usuario")).map(minimizar_usuario).unwrap_or_default();
        guardar_sesion(self.client.sesion().as_ref(), &token, refresh.as_deref(), &usuario)?;
        log::info!("sesión iniciada para {}", usuario.email);
        Ok(usuario)
    }

    pub async fn register(&self, datos: &RegistroUsuario) -> ApiResult<UsuarioSesion> {
        validar_registro(&datos.nombre, &datos.email, &datos.password).map_err(ServiceError::Validacion)?;
        let body = serde_json::to_value(datos)?;
        let (status, cuerpo) = self.client.enviar_una_vez(Method::POST, AUTH_REGISTER, Some(&body)).await?;
        if !status.is_success() {
            return Err(error_de_status(status, &cuerpo));
        }
        let v = if cuerpo.trim().is_empty() { Value::Null } else { normalizar_respuesta(serde_json::from_str(&cuerpo)?)? };
        let user_v = v.get("user").or_else(|| v.get("usuario")).unwrap_or(&v);
        let mut usuario = minimizar_usuario(user_v);
        if usuario.email.is_empty() {
            usuario.email = datos.email.clone();
        }
        if usuario.nombre.is_empty() {
            usuario.nombre = datos.nombre.clone();
        }
        // algunos despliegues inician sesión directamente al registrar
        if let Some((token, refresh)) = extraer_tokens(&v) {
            guardar_sesion(self.client.sesion().as_ref(), &token, refresh.as_deref(), &usuario)?;
        }
        Ok(usuario)
    }

    pub async fn refresh(&self) -> ApiResult<String> {
        self.client.refrescar_token().await
    }

    /// Usuario autenticado según el backend; actualiza el registro guardado.
    pub async fn me(&self) -> ApiResult<UsuarioSesion> {
        let v = self.client.enviar(Method::GET, AUTH_ME, None).await?;
        let usuario = minimizar_usuario(v.get("user").unwrap_or(&v));
        self.client.sesion().set(CLAVE_USUARIO, &serde_json::to_string(&usuario)?)?;
        Ok(usuario)
    }

    pub fn logout(&self) -> ApiResult<()> {
        limpiar_sesion(self.client.sesion().as_ref())
    }

    pub fn usuario_actual(&self) -> ApiResult<Option<UsuarioSesion>> {
        leer_usuario(self.client.sesion().as_ref())
    }

    pub fn esta_autenticado(&self) -> bool {
        matches!(self.client.sesion().get(CLAVE_TOKEN), Ok(Some(t)) if !t.is_empty())
    }
}
