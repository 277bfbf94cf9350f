//! Cliente del modelo de lenguaje (API `generateContent` de Gemini).

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;

use crate::config::Config;
use crate::errores::ServiceError;
use crate::services::backend::error_de_status;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Algo que, dado un prompt, devuelve texto generado.
pub trait ModeloTexto {
    fn generar(&self, prompt: &str) -> impl Future<Output = Result<String, ServiceError>>;
}

#[derive(Debug, Deserialize)]
struct RespuestaGemini {
    #[serde(default)]
    candidates: Vec<Candidato>,
}

#[derive(Debug, Deserialize)]
struct Candidato {
    content: Option<Contenido>,
}

#[derive(Debug, Deserialize)]
struct Contenido {
    #[serde(default)]
    parts: Vec<Parte>,
}

#[derive(Debug, Deserialize)]
struct Parte {
    text: Option<String>,
}

/// Cuerpo de `POST /api/gemini`.
#[derive(Debug, Deserialize, Serialize)]
pub struct PeticionPrompt {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key, model: model.to_string() }
    }

    pub fn from_config(cfg: &Config, http: reqwest::Client) -> Self {
        Self::new(http, GEMINI_BASE_URL, cfg.gemini_api_key.clone(), &cfg.gemini_model)
    }

    fn url(&self, key: &str) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, key)
    }
}

/// Texto concatenado de las partes del primer candidato.
fn texto_primer_candidato(r: RespuestaGemini) -> Option<String> {
    let partes = r.candidates.into_iter().next()?.content?.parts;
    let texto: String = partes.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join("");
    if texto.is_empty() { None } else { Some(texto) }
}

impl ModeloTexto for GeminiClient {
    async fn generar(&self, prompt: &str) -> Result<String, ServiceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Configuracion("GEMINI_API_KEY no está configurada".to_string()))?;
        let body = json!({ "contents": [ { "parts": [ { "text": prompt } ] } ] });
        let resp = self.http.post(self.url(key)).json(&body).send().await?;
        let status = resp.status();
        let texto = resp.text().await?;
        if !status.is_success() {
            log::warn!("gemini respondió {}", status);
            return Err(error_de_status(status, &texto));
        }
        let r: RespuestaGemini = serde_json::from_str(&texto)?;
        texto_primer_candidato(r).ok_or_else(|| ServiceError::Parseo("la respuesta del modelo no contiene texto".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrae_texto_de_candidato() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hola "},{"text":"mundo"}],"role":"model"}}]}"#;
        let r: RespuestaGemini = serde_json::from_str(raw).unwrap();
        assert_eq!(texto_primer_candidato(r).as_deref(), Some("hola mundo"));
    }

    #[test]
    fn sin_candidatos_es_none() {
        let r: RespuestaGemini = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(texto_primer_candidato(r).is_none());
    }

    #[actix_web::test]
    async fn sin_api_key_es_error_de_configuracion() {
        let c = GeminiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", None, "m");
        match c.generar("hola").await {
            Err(ServiceError::Configuracion(_)) => {}
            otro => panic!("inesperado: {:?}", otro),
        }
    }
}
