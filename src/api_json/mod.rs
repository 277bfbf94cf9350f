//! Sobre JSON `{success, data, message}` que consume el frontend.
//!
//! Internamente todas las operaciones devuelven [`ApiResult<T>`]; la forma del
//! sobre sólo existe en el borde HTTP, construida aquí una única vez.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::errores::ServiceError;

pub type ApiResult<T> = Result<T, ServiceError>;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope { success: true, data: Some(data), message: None }
    }

    pub fn ok_con_mensaje(data: T, message: &str) -> Self {
        Envelope { success: true, data: Some(data), message: Some(message.to_string()) }
    }

    pub fn error(message: String) -> Self {
        Envelope { success: false, data: None, message: Some(message) }
    }
}

impl<T> From<ApiResult<T>> for Envelope<T> {
    fn from(r: ApiResult<T>) -> Self {
        match r {
            Ok(data) => Envelope::ok(data),
            Err(e) => Envelope::error(e.mensaje_usuario()),
        }
    }
}

/// Convierte un resultado en respuesta HTTP: 200 con el sobre, o el código del error.
pub fn respuesta<T: Serialize>(r: ApiResult<T>) -> HttpResponse {
    match r {
        Ok(data) => HttpResponse::Ok().json(Envelope::ok(data)),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_http()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if let ServiceError::Validacion(errores) = &e {
                return HttpResponse::build(status).json(serde_json::json!({
                    "success": false,
                    "message": e.mensaje_usuario(),
                    "errores": errores,
                }));
            }
            HttpResponse::build(status).json(Envelope::<T>::error(e.mensaje_usuario()))
        }
    }
}
