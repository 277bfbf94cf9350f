use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::errores::ServiceError;
use crate::scraper::{candidatos_logo, extraer_logo, FuenteTexto};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PeticionUrl {
    #[serde(default)]
    pub url: String,
}

/// POST /api/scraper
/// Body: `{ "url": "https://..." }` → `{ "text": "..." }`
pub async fn scraper_handler(body: web::Json<PeticionUrl>, state: web::Data<AppState>) -> impl Responder {
    let url = body.into_inner().url;
    match state.scraper.obtener_texto(&url).await {
        Ok(text) => HttpResponse::Ok().json(json!({"text": text})),
        Err(e @ ServiceError::Validacion(_)) => HttpResponse::BadRequest().json(json!({"error": e.mensaje_usuario()})),
        Err(e) => {
            log::warn!("scraper {}: {}", url, e);
            HttpResponse::InternalServerError().json(json!({
                "error": "No se pudo obtener el contenido de la página",
                "details": e.to_string(),
            }))
        }
    }
}

/// GET /api/logo?url=https://...
/// Devuelve el primer candidato de logo que responde 200, o `null`.
pub async fn logo_handler(query: web::Query<PeticionUrl>, state: web::Data<AppState>) -> impl Responder {
    let candidatos = match candidatos_logo(&query.url) {
        Ok(c) => c,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.mensaje_usuario()})),
    };
    let logo = extraer_logo(&state.http, &candidatos).await;
    HttpResponse::Ok().json(json!({"logo": logo}))
}
