use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::api_json::{respuesta, ApiResult};
use crate::errores::ServiceError;
use crate::mapa::{agrupar_por_departamento, EcosystemMapItem, MapaEcosistema};
use crate::models::{Articulador, Company, Promotor};
use crate::server::AppState;
use crate::services::{BackendClient, Entidad};
use crate::sesion::{MemorySessionStore, SessionStore};

/// Token del encabezado `Authorization: Bearer ...`, si lo hay.
pub fn bearer(req: &HttpRequest) -> Option<String> {
    let valor = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (esquema, token) = valor.split_once(' ')?;
    if esquema.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

async fn cargar<T: Entidad>(client: &BackendClient, errores: &mut Vec<ServiceError>) -> Vec<T> {
    match client.listar::<T>().await {
        Ok(v) => v,
        Err(e) => {
            log::warn!("mapa: no se pudo listar {:?}: {}", T::RECURSO, e);
            errores.push(e);
            Vec::new()
        }
    }
}

/// Lee las cuatro colecciones y las agrupa. Un recurso caído no impide mostrar
/// el resto; sólo si fallan todos se devuelve error.
pub async fn construir_mapa(client: &BackendClient) -> ApiResult<MapaEcosistema> {
    let mut errores = Vec::new();
    let companies: Vec<Company> = cargar(client, &mut errores).await;
    let articuladores: Vec<Articulador> = cargar(client, &mut errores).await;
    let convocatorias = match client.listar_convocatorias_con_estado().await {
        Ok(v) => v,
        Err(e) => {
            log::warn!("mapa: no se pudo listar convocatorias: {}", e);
            errores.push(e);
            Vec::new()
        }
    };
    let promotores: Vec<Promotor> = cargar(client, &mut errores).await;

    if errores.len() == 4 {
        return Err(errores.remove(0));
    }

    let mut items: Vec<EcosystemMapItem> = Vec::new();
    items.extend(companies.iter().map(EcosystemMapItem::from));
    items.extend(articuladores.iter().map(EcosystemMapItem::from));
    items.extend(convocatorias.iter().map(EcosystemMapItem::from));
    items.extend(promotores.iter().map(EcosystemMapItem::from));
    Ok(agrupar_por_departamento(items))
}

/// GET /api/mapa
pub async fn mapa_handler(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let sesion: Arc<dyn SessionStore> = match bearer(&req) {
        Some(token) => Arc::new(MemorySessionStore::con_token(&token)),
        None => state.sesion.clone(),
    };
    let client = BackendClient::from_config(&state.config, state.http.clone(), sesion);
    respuesta(construir_mapa(&client).await)
}
