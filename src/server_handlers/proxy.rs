use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::proxy::{recurso_proxy, reenviar, url_destino, ErrorDestino, PeticionProxy};
use crate::server::AppState;

/// GET/POST/PUT/DELETE /api/proxy/{recurso}
/// Reenvía la petición al backend y devuelve su status y cuerpo sin tocarlos.
pub async fn proxy_handler(
    req: HttpRequest,
    recurso: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let nombre = recurso.into_inner();
    let recurso = match recurso_proxy(&nombre) {
        Some(r) => r,
        None => return HttpResponse::NotFound().json(json!({"error": format!("recurso desconocido: {}", nombre)})),
    };

    let url = match url_destino(&state.config.backend_url, recurso, state.config.endpoints, &query) {
        Ok(u) => u,
        Err(e @ ErrorDestino::IdInvalido(_)) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Error de configuración del proxy", "details": e.to_string()}));
        }
    };

    // actix y reqwest usan versiones distintas de `http`
    let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => return HttpResponse::MethodNotAllowed().finish(),
    };
    let authorization = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let content_type = req.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

    log::debug!("proxy {} {}", method, url);
    let peticion = PeticionProxy { method, url, authorization, content_type, cuerpo: body.to_vec() };
    match reenviar(&state.http, state.config.proxy_timeout, peticion).await {
        Ok(r) => {
            let status = StatusCode::from_u16(r.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut resp = HttpResponse::build(status);
            if let Some(ct) = r.content_type {
                resp.insert_header((header::CONTENT_TYPE, ct));
            }
            resp.body(r.cuerpo)
        }
        Err(e) => {
            log::error!("proxy hacia {} falló: {}", nombre, e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Error al conectar con el backend",
                "details": e.to_string(),
            }))
        }
    }
}
