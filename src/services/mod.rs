// Capa de servicios: cliente tipado del backend REST y autenticación.
pub mod endpoints;
pub mod backend;
pub mod auth;

pub use backend::{extraer_mensaje, normalizar_respuesta, BackendClient, Entidad};
pub use auth::{minimizar_usuario, AuthService, RegistroUsuario};
pub use endpoints::{EndpointSet, Recurso};
