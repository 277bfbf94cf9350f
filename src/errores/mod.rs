//! Error común de la capa de servicios y su traducción a mensajes para el usuario.

use crate::validacion::ErrorValidacion;

pub const MSG_SIN_CONEXION: &str = "No se pudo conectar con el servidor. Verifique su conexión.";
pub const MSG_CREDENCIALES: &str = "Usuario y/o contraseña incorrectos";
pub const MSG_YA_REGISTRADO: &str = "El usuario ya se encuentra registrado";
pub const MSG_SESION_EXPIRADA: &str = "Su sesión ha expirado. Inicie sesión nuevamente.";
pub const MSG_TIMEOUT: &str = "El servidor tardó demasiado en responder";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("error de red: {0}")]
    Red(String),
    #[error("tiempo de espera agotado: {0}")]
    Timeout(String),
    #[error("no autorizado")]
    NoAutorizado,
    #[error("sesión expirada")]
    SesionExpirada,
    #[error("errores de validación: {0:?}")]
    Validacion(Vec<ErrorValidacion>),
    #[error("backend respondió {status}: {mensaje}")]
    Backend { status: u16, mensaje: String },
    #[error("respuesta inválida: {0}")]
    Parseo(String),
    #[error("configuración: {0}")]
    Configuracion(String),
    #[error("almacenamiento de sesión: {0}")]
    Almacenamiento(String),
}

impl ServiceError {
    /// Texto que se muestra al usuario final.
    pub fn mensaje_usuario(&self) -> String {
        match self {
            ServiceError::Red(_) => MSG_SIN_CONEXION.to_string(),
            ServiceError::Timeout(_) => MSG_TIMEOUT.to_string(),
            ServiceError::NoAutorizado => MSG_CREDENCIALES.to_string(),
            ServiceError::SesionExpirada => MSG_SESION_EXPIRADA.to_string(),
            ServiceError::Validacion(errs) => errs.iter().map(|e| e.mensaje.clone()).collect::<Vec<_>>().join(". "),
            ServiceError::Backend { mensaje, .. } => mensaje_amigable(mensaje),
            ServiceError::Parseo(m) | ServiceError::Configuracion(m) | ServiceError::Almacenamiento(m) => m.clone(),
        }
    }

    /// Código HTTP con el que un handler debe reportar este error.
    pub fn status_http(&self) -> u16 {
        match self {
            ServiceError::Validacion(_) => 400,
            ServiceError::NoAutorizado | ServiceError::SesionExpirada => 401,
            ServiceError::Backend { status, .. } if *status >= 400 => *status,
            ServiceError::Timeout(_) => 504,
            ServiceError::Red(_) => 502,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout(e.to_string())
        } else if e.is_decode() {
            ServiceError::Parseo(e.to_string())
        } else {
            ServiceError::Red(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Parseo(e.to_string())
    }
}

/// Traduce mensajes del backend a textos más claros por coincidencia de palabras clave.
/// Si no hay coincidencia el mensaje se devuelve tal cual.
pub fn mensaje_amigable(mensaje: &str) -> String {
    let m = mensaje.to_lowercase();
    if m.contains("credenciales") || m.contains("invalid credentials") {
        return MSG_CREDENCIALES.to_string();
    }
    if m.contains("ya existe") || m.contains("already exists") || m.contains("ya está registrado") {
        return MSG_YA_REGISTRADO.to_string();
    }
    if m.contains("token expirado") || m.contains("token expired") {
        return MSG_SESION_EXPIRADA.to_string();
    }
    if m.contains("failed to fetch") || m.contains("network") {
        return MSG_SIN_CONEXION.to_string();
    }
    mensaje.to_string()
}
