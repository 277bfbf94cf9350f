use actix_web::{web, HttpResponse};

use crate::api_json::respuesta;
use crate::prefill::prellenar_desde_url;
use crate::server::AppState;
use crate::server_handlers::PeticionUrl;

/// POST /api/prefill
/// Descarga la página, la analiza con el modelo y devuelve el formulario de
/// convocatoria prellenado dentro del sobre `{success, data, message}`.
pub async fn prefill_handler(body: web::Json<PeticionUrl>, state: web::Data<AppState>) -> HttpResponse {
    let url = body.into_inner().url;
    let r = prellenar_desde_url(&state.scraper, &state.gemini, &url).await;
    if let Err(e) = &r {
        log::warn!("prefill {}: {}", url, e);
    }
    respuesta(r)
}
