use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

use crate::config::Config;
use crate::errores::ServiceError;
use crate::gemini::GeminiClient;
use crate::scraper::PageScraper;
use crate::server_handlers::{
    gemini_handler, health_handler, help_handler, logo_handler, mapa_handler, prefill_handler, proxy_handler,
    scraper_handler,
};
use crate::sesion::{MemorySessionStore, SessionStore, SqliteSessionStore};

/// Estado compartido por todos los workers.
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub gemini: GeminiClient,
    pub scraper: PageScraper,
    /// Sesión propia del servidor, usada cuando la petición no trae bearer.
    pub sesion: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<AppState, ServiceError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::Configuracion(format!("no se pudo crear el cliente HTTP: {}", e)))?;
        let sesion: Arc<dyn SessionStore> = match &config.session_db_path {
            Some(path) => {
                log::info!("sesión persistida en {}", path.display());
                Arc::new(SqliteSessionStore::open(path)?)
            }
            None => Arc::new(MemorySessionStore::new()),
        };
        Ok(AppState {
            gemini: GeminiClient::from_config(&config, http.clone()),
            scraper: PageScraper::new(http.clone()),
            http,
            sesion,
            config,
        })
    }
}

/// Registra todas las rutas de la API.
pub fn rutas(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/proxy/{recurso}")
            .route(web::get().to(proxy_handler))
            .route(web::post().to(proxy_handler))
            .route(web::put().to(proxy_handler))
            .route(web::delete().to(proxy_handler)),
    )
    .route("/api/gemini", web::post().to(gemini_handler))
    .route("/api/scraper", web::post().to(scraper_handler))
    .route("/api/prefill", web::post().to(prefill_handler))
    .route("/api/logo", web::get().to(logo_handler))
    .route("/api/mapa", web::get().to(mapa_handler))
    .route("/health", web::get().to(health_handler))
    .route("/help", web::get().to(help_handler));
}

fn cors(origen: Option<&str>) -> Cors {
    let base = match origen {
        Some(o) => Cors::default().allowed_origin(o),
        None => Cors::default().allow_any_origin(),
    };
    base.allow_any_method().allow_any_header().max_age(3600)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = AppState::from_config(config).map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = web::Data::new(state);

    log::info!("backend REST en {}", state.config.backend_url);
    if state.config.gemini_api_key.is_none() {
        log::warn!("GEMINI_API_KEY no configurada: /api/gemini y /api/prefill responderán error");
    }

    HttpServer::new(move || {
        let origen = state.config.cors_origin.clone();
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors(origen.as_deref()))
            .configure(rutas)
    })
    .bind(bind_addr)?
    .run()
    .await
}
