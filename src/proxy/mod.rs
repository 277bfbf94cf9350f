//! Reenvío de peticiones del navegador al backend REST.
//!
//! Sólo traduce `?id=N` en el segmento `/N` y copia cabeceras de autorización y
//! tipo de contenido; el cuerpo y el status del backend se devuelven tal cual.

use reqwest::{Method, Url};
use std::time::Duration;

use crate::services::endpoints::{join_url, EndpointSet, Recurso};

/// Recursos expuestos bajo `/api/proxy/{nombre}`.
pub fn recurso_proxy(nombre: &str) -> Option<Recurso> {
    match nombre.to_lowercase().as_str() {
        "companies" => Some(Recurso::Companies),
        "convocatorias" => Some(Recurso::Convocatorias),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ErrorDestino {
    #[error("el id debe ser un número entero: {0}")]
    IdInvalido(String),
    #[error("url de backend inválida: {0}")]
    BackendUrl(String),
}

/// URL final en el backend: `?id=` pasa a ser segmento de ruta, el resto de la
/// query se conserva. El id tiene que ser entero.
pub fn url_destino(base: &str, recurso: Recurso, set: EndpointSet, query: &[(String, String)]) -> Result<Url, ErrorDestino> {
    let mut path = recurso.path(set).to_string();
    if let Some((_, id)) = query.iter().find(|(k, v)| k == "id" && !v.trim().is_empty()) {
        let id = id.trim().parse::<i64>().map_err(|_| ErrorDestino::IdInvalido(id.clone()))?;
        path.push('/');
        path.push_str(&id.to_string());
    }
    let mut url = Url::parse(&join_url(base, &path)).map_err(|e| ErrorDestino::BackendUrl(e.to_string()))?;
    let resto: Vec<&(String, String)> = query.iter().filter(|(k, _)| k != "id").collect();
    if !resto.is_empty() {
        let mut pares = url.query_pairs_mut();
        for (k, v) in resto {
            pares.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Respuesta del backend tal como se devolverá al navegador.
#[derive(Debug)]
pub struct RespuestaProxy {
    pub status: u16,
    pub content_type: Option<String>,
    pub cuerpo: Vec<u8>,
}

pub struct PeticionProxy<'a> {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub cuerpo: Vec<u8>,
}

/// Ejecuta la petición con el límite de tiempo indicado.
pub async fn reenviar(http: &reqwest::Client, timeout: Duration, p: PeticionProxy<'_>) -> Result<RespuestaProxy, reqwest::Error> {
    let tiene_cuerpo = !p.cuerpo.is_empty() && p.method != Method::GET && p.method != Method::DELETE;
    let mut req = http.request(p.method, p.url).timeout(timeout);
    if let Some(a) = p.authorization {
        req = req.header(reqwest::header::AUTHORIZATION, a);
    }
    if tiene_cuerpo {
        req = req
            .header(reqwest::header::CONTENT_TYPE, p.content_type.unwrap_or("application/json"))
            .body(p.cuerpo);
    }
    let resp = req.send().await?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let cuerpo = resp.bytes().await?.to_vec();
    Ok(RespuestaProxy { status, content_type, cuerpo })
}
