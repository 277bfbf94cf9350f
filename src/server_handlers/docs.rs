use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

pub async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API del ecosistema de innovación: proxy al backend REST, análisis de convocatorias con IA y mapa por departamento.",
        "endpoints": [
            {"method": "GET|POST|PUT|DELETE", "path": "/api/proxy/companies", "query": "?id=N", "note": "reenvía a {BACKEND_URL}/Companies[/N]"},
            {"method": "GET|POST|PUT|DELETE", "path": "/api/proxy/convocatorias", "query": "?id=N", "note": "reenvía a {BACKEND_URL}/Convocatorias[/N]"},
            {"method": "POST", "path": "/api/gemini", "body": {"prompt": "Resume esta convocatoria..."}, "response": {"result": "..."}},
            {"method": "POST", "path": "/api/scraper", "body": {"url": "https://www.ejemplo.gov.co/convocatoria"}, "response": {"text": "..."}},
            {"method": "POST", "path": "/api/prefill", "body": {"url": "https://www.ejemplo.gov.co/convocatoria"}, "response": {"success": true, "data": {"formulario": {}, "origen": "llm|heuristica"}}},
            {"method": "GET", "path": "/api/logo", "query": "?url=https://www.ejemplo.com", "response": {"logo": "https://...|null"}},
            {"method": "GET", "path": "/api/mapa", "note": "grupos por departamento; reenvía el bearer recibido"},
            {"method": "GET", "path": "/health"}
        ],
        "note": "Las rutas /api/proxy conservan el status y el cuerpo del backend. Un fallo de red responde 500 con {error, details}."
    });

    HttpResponse::Ok().json(help)
}
