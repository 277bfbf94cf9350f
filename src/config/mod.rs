//! Configuración del servidor leída desde `.env` y variables de entorno.
//!
//! Variables reconocidas:
//! - `BIND_ADDR` (por defecto `127.0.0.1:8080`)
//! - `BACKEND_URL` o `NEXT_PUBLIC_API_URL` (origen del backend REST)
//! - `GEMINI_API_KEY`, `GEMINI_MODEL`
//! - `PROXY_TIMEOUT_SECS` (por defecto 30)
//! - `SESSION_DB_PATH` (si falta, la sesión vive en memoria)
//! - `ENTIDADES_API` (`legacy` | `nuevas`)
//! - `CORS_ORIGIN` (origen permitido del frontend; si falta se permite cualquiera)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::endpoints::EndpointSet;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} no es un número válido: {valor}")]
    NumeroInvalido { var: &'static str, valor: String },
    #[error("ENTIDADES_API desconocido: {0} (use 'legacy' o 'nuevas')")]
    EndpointsDesconocidos(String),
    #[error("BACKEND_URL inválida: {0}")]
    BackendUrl(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub backend_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub proxy_timeout: Duration,
    pub session_db_path: Option<PathBuf>,
    pub endpoints: EndpointSet,
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            proxy_timeout: Duration::from_secs(DEFAULT_PROXY_TIMEOUT_SECS),
            session_db_path: None,
            endpoints: EndpointSet::Legacy,
            cors_origin: None,
        }
    }
}

// load .env if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl Config {
    /// Carga `.env` (si existe) y construye la configuración desde el entorno.
    pub fn from_env() -> Result<Config, ConfigError> {
        load_dotenv();
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Versión parametrizable para pruebas: `lookup` devuelve el valor de una variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();

        if let Some(b) = non_empty("BIND_ADDR") {
            cfg.bind_addr = b;
        }

        if let Some(url) = non_empty("BACKEND_URL").or_else(|| non_empty("NEXT_PUBLIC_API_URL")) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::BackendUrl(url));
            }
            cfg.backend_url = url.trim_end_matches('/').to_string();
        }

        cfg.gemini_api_key = non_empty("GEMINI_API_KEY");
        if let Some(m) = non_empty("GEMINI_MODEL") {
            cfg.gemini_model = m;
        }

        if let Some(t) = non_empty("PROXY_TIMEOUT_SECS") {
            let secs = t.parse::<u64>().map_err(|_| ConfigError::NumeroInvalido { var: "PROXY_TIMEOUT_SECS", valor: t.clone() })?;
            cfg.proxy_timeout = Duration::from_secs(secs);
        }

        cfg.session_db_path = non_empty("SESSION_DB_PATH").map(PathBuf::from);

        if let Some(e) = non_empty("ENTIDADES_API") {
            cfg.endpoints = match e.to_lowercase().as_str() {
                "legacy" => EndpointSet::Legacy,
                "nuevas" | "nuevas_entidades" => EndpointSet::Nuevas,
                _ => return Err(ConfigError::EndpointsDesconocidos(e)),
            };
        }

        cfg.cors_origin = non_empty("CORS_ORIGIN");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_de(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_sin_variables() {
        let cfg = Config::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND);
        assert_eq!(cfg.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.proxy_timeout, Duration::from_secs(30));
        assert_eq!(cfg.endpoints, EndpointSet::Legacy);
        assert!(cfg.gemini_api_key.is_none());
    }

    #[test]
    fn backend_url_sin_barra_final() {
        let cfg = Config::from_lookup(lookup_de(&[("BACKEND_URL", "https://api.ejemplo.co/api/")])).unwrap();
        assert_eq!(cfg.backend_url, "https://api.ejemplo.co/api");
    }

    #[test]
    fn next_public_api_url_como_respaldo() {
        let cfg = Config::from_lookup(lookup_de(&[("NEXT_PUBLIC_API_URL", "http://10.0.0.2:5000")])).unwrap();
        assert_eq!(cfg.backend_url, "http://10.0.0.2:5000");
    }

    #[test]
    fn timeout_invalido_es_error() {
        let err = Config::from_lookup(lookup_de(&[("PROXY_TIMEOUT_SECS", "treinta")])).unwrap_err();
        assert_eq!(err, ConfigError::NumeroInvalido { var: "PROXY_TIMEOUT_SECS", valor: "treinta".to_string() });
    }

    #[test]
    fn endpoints_nuevas() {
        let cfg = Config::from_lookup(lookup_de(&[("ENTIDADES_API", "Nuevas")])).unwrap();
        assert_eq!(cfg.endpoints, EndpointSet::Nuevas);
        assert!(Config::from_lookup(lookup_de(&[("ENTIDADES_API", "otra")])).is_err());
    }
}
