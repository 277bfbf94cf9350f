// Biblioteca raíz del crate `ecosistema`.
// Servidor de apoyo del portal del ecosistema de innovación: proxy al backend
// REST, cliente tipado de sus recursos, análisis de convocatorias con IA y
// agrupación del mapa por departamento.
pub mod config;
pub mod errores;
pub mod fechas;
pub mod models;
pub mod validacion;
pub mod api_json;
pub mod sesion;
pub mod services;
pub mod proxy;
pub mod gemini;
pub mod scraper;
pub mod prefill;
pub mod mapa;
pub mod server;
pub mod server_handlers;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
