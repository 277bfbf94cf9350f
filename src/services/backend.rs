use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::endpoints::{join_url, EndpointSet, Recurso};
use crate::api_json::ApiResult;
use crate::config::Config;
use crate::errores::ServiceError;
use crate::models::{
    Articulador, ArticuladorCompany, ArticuladorConvocatoria, Company, Convocatoria, PortafolioArco, Promotor,
};
use crate::sesion::{limpiar_sesion, SessionStore, CLAVE_TOKEN};
use crate::validacion::{validar_articulador, validar_company, validar_convocatoria, ErrorValidacion};

/// Entidad REST del backend: sabe en qué recurso vive y cómo validarse antes de enviarse.
pub trait Entidad: Serialize + DeserializeOwned {
    const RECURSO: Recurso;

    fn validar(&self) -> Result<(), Vec<ErrorValidacion>> {
        Ok(())
    }
}

impl Entidad for Company {
    const RECURSO: Recurso = Recurso::Companies;
    fn validar(&self) -> Result<(), Vec<ErrorValidacion>> {
        validar_company(self)
    }
}

impl Entidad for Articulador {
    const RECURSO: Recurso = Recurso::Articuladores;
    fn validar(&self) -> Result<(), Vec<ErrorValidacion>> {
        validar_articulador(self)
    }
}

impl Entidad for Convocatoria {
    const RECURSO: Recurso = Recurso::Convocatorias;
    fn validar(&self) -> Result<(), Vec<ErrorValidacion>> {
        validar_convocatoria(self)
    }
}

impl Entidad for Promotor {
    const RECURSO: Recurso = Recurso::Promotores;
}

impl Entidad for PortafolioArco {
    const RECURSO: Recurso = Recurso::PortafolioArco;
}

impl Entidad for ArticuladorCompany {
    const RECURSO: Recurso = Recurso::ArticuladorCompany;
}

impl Entidad for ArticuladorConvocatoria {
    const RECURSO: Recurso = Recurso::ArticuladorConvocatoria;
}

/// Cliente tipado del backend REST. Barato de clonar.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    endpoints: EndpointSet,
    sesion: Arc<dyn SessionStore>,
}

/// Campos que puede traer el sobre `{success, data, message}` del backend.
const CLAVES_SOBRE: [&str; 6] = ["success", "data", "message", "error", "total", "count"];

/// Quita el sobre si lo hay. `success: false` se convierte en error.
pub fn normalizar_respuesta(v: Value) -> ApiResult<Value> {
    let es_sobre = match &v {
        Value::Object(map) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                let mensaje = extraer_mensaje(&v).unwrap_or_else(|| "La operación no se pudo completar".to_string());
                return Err(ServiceError::Backend { status: 200, mensaje });
            }
            map.contains_key("data") && map.keys().all(|k| CLAVES_SOBRE.contains(&k.as_str()))
        }
        _ => false,
    };
    match v {
        Value::Object(mut m) if es_sobre => Ok(m.remove("data").unwrap_or(Value::Null)),
        otro => Ok(otro),
    }
}

/// Mensaje de error reportado por el backend (`message`, `mensaje`, `error` o `title`).
pub fn extraer_mensaje(v: &Value) -> Option<String> {
    for k in ["message", "mensaje", "error", "title"] {
        if let Some(s) = v.get(k).and_then(|x| x.as_str()) {
            if !s.trim().is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

pub(crate) fn error_de_status(status: StatusCode, cuerpo: &str) -> ServiceError {
    let mensaje = serde_json::from_str::<Value>(cuerpo)
        .ok()
        .and_then(|v| extraer_mensaje(&v))
        .or_else(|| {
            let t = cuerpo.trim();
            if !t.is_empty() && t.len() <= 200 && !t.starts_with('<') { Some(t.to_string()) } else { None }
        })
        .unwrap_or_else(|| format!("Error {}", status.as_u16()));
    ServiceError::Backend { status: status.as_u16(), mensaje }
}

impl BackendClient {
    pub fn new(base_url: &str, http: reqwest::Client, endpoints: EndpointSet, sesion: Arc<dyn SessionStore>) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http, endpoints, sesion }
    }

    pub fn from_config(cfg: &Config, http: reqwest::Client, sesion: Arc<dyn SessionStore>) -> Self {
        Self::new(&cfg.backend_url, http, cfg.endpoints, sesion)
    }

    pub fn sesion(&self) -> &Arc<dyn SessionStore> {
        &self.sesion
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn ruta<T: Entidad>(&self) -> &'static str {
        T::RECURSO.path(self.endpoints)
    }

    /// Una sola petición HTTP, con bearer si hay token. Devuelve status y cuerpo crudo.
    pub(crate) async fn enviar_una_vez(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<(StatusCode, String)> {
        let mut req = self.http.request(method, self.url(path));
        if let Some(token) = self.sesion.get(CLAVE_TOKEN)? {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let texto = resp.text().await?;
        Ok((status, texto))
    }

    fn interpretar(status: StatusCode, cuerpo: &str) -> ApiResult<Value> {
        if !status.is_success() {
            return Err(error_de_status(status, cuerpo));
        }
        if cuerpo.trim().is_empty() {
            return Ok(Value::Null);
        }
        let v: Value = serde_json::from_str(cuerpo)?;
        normalizar_respuesta(v)
    }

    /// Petición autenticada. Ante un 401 intenta refrescar el token una vez y
    /// repite la petición; si el refresco falla se cierra la sesión.
    pub async fn enviar(&self, method: Method, path: &str, body: Option<&Value>) -> ApiResult<Value> {
        let (status, cuerpo) = self.enviar_una_vez(method.clone(), path, body).await?;
        if status != StatusCode::UNAUTHORIZED {
            return Self::interpretar(status, &cuerpo);
        }

        log::info!("401 en {} {}: intentando refrescar token", method, path);
        if let Err(e) = self.refrescar_token().await {
            log::warn!("refresco de token falló ({}); cerrando sesión", e);
            limpiar_sesion(self.sesion.as_ref())?;
            return Err(ServiceError::SesionExpirada);
        }

        let (status, cuerpo) = self.enviar_una_vez(method, path, body).await?;
        if status == StatusCode::UNAUTHORIZED {
            limpiar_sesion(self.sesion.as_ref())?;
            return Err(ServiceError::SesionExpirada);
        }
        Self::interpretar(status, &cuerpo)
    }

    pub async fn listar<T: Entidad>(&self) -> ApiResult<Vec<T>> {
        let v = self.enviar(Method::GET, self.ruta::<T>(), None).await?;
        if v.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(v)?)
    }

    pub async fn obtener<T: Entidad>(&self, id: i64) -> ApiResult<T> {
        let v = self.enviar(Method::GET, &format!("{}/{}", self.ruta::<T>(), id), None).await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Valida y crea. Si la validación falla no se hace ninguna petición.
    pub async fn crear<T: Entidad>(&self, entidad: &T) -> ApiResult<T> {
        entidad.validar().map_err(ServiceError::Validacion)?;
        let body = serde_json::to_value(entidad)?;
        let v = self.enviar(Method::POST, self.ruta::<T>(), Some(&body)).await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Valida y actualiza. Algunos endpoints responden 204 sin cuerpo: en ese
    /// caso se devuelve la misma entidad enviada.
    pub async fn actualizar<T: Entidad + Clone>(&self, id: i64, entidad: &T) -> ApiResult<T> {
        entidad.validar().map_err(ServiceError::Validacion)?;
        let body = serde_json::to_value(entidad)?;
        let v = self.enviar(Method::PUT, &format!("{}/{}", self.ruta::<T>(), id), Some(&body)).await?;
        if v.is_null() {
            return Ok(entidad.clone());
        }
        Ok(serde_json::from_value(v)?)
    }

    pub async fn eliminar<T: Entidad>(&self, id: i64) -> ApiResult<()> {
        self.enviar(Method::DELETE, &format!("{}/{}", self.ruta::<T>(), id), None).await?;
        Ok(())
    }

    /// Convocatorias con el estado vigente ya resuelto (manual o por fechas).
    pub async fn listar_convocatorias_con_estado(&self) -> ApiResult<Vec<Convocatoria>> {
        let ahora = chrono::Utc::now();
        let mut lista: Vec<Convocatoria> = self.listar().await?;
        for c in lista.iter_mut() {
            c.estado = Some(c.estado_efectivo(ahora));
        }
        Ok(lista)
    }

    pub async fn vincular_company(&self, articulador_id: i64, company_id: i64) -> ApiResult<ArticuladorCompany> {
        self.crear(&ArticuladorCompany { id: None, articulador_id, company_id }).await
    }

    pub async fn vincular_convocatoria(&self, articulador_id: i64, convocatoria_id: i64) -> ApiResult<ArticuladorConvocatoria> {
        self.crear(&ArticuladorConvocatoria { id: None, articulador_id, convocatoria_id }).await
    }
}
