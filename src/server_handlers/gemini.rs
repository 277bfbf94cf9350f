use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::errores::ServiceError;
use crate::gemini::{ModeloTexto, PeticionPrompt};
use crate::server::AppState;

/// POST /api/gemini
/// Body: `{ "prompt": "..." }` → `{ "result": "..." }`
pub async fn gemini_handler(body: web::Json<PeticionPrompt>, state: web::Data<AppState>) -> impl Responder {
    let prompt = body.into_inner().prompt;
    if prompt.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "El prompt es obligatorio"}));
    }

    match state.gemini.generar(&prompt).await {
        Ok(result) => HttpResponse::Ok().json(json!({"result": result})),
        Err(ServiceError::Configuracion(m)) => HttpResponse::InternalServerError().json(json!({"error": m})),
        Err(e) => {
            log::error!("gemini: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Error al generar contenido",
                "details": e.to_string(),
            }))
        }
    }
}
