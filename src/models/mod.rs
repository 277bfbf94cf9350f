// Estructuras de datos principales (espejo de los recursos REST del backend)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fechas::parse_fecha;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub id: Option<i64>,
    pub nombre: String,
    pub nit: Option<String>,
    pub sector: Option<String>,
    pub descripcion: Option<String>,
    pub sitio_web: Option<String>,
    pub logo_url: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub ciudad: Option<String>,
    pub departamento: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Articulador {
    pub id: Option<i64>,
    pub nombre: String,
    pub tipo: Option<String>,
    pub descripcion: Option<String>,
    pub contacto: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub sitio_web: Option<String>,
    pub ciudad: Option<String>,
    pub departamento: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

/// Estado del ciclo de vida de una convocatoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoConvocatoria {
    Activa,
    Cerrada,
    Pendiente,
}

impl EstadoConvocatoria {
    /// Interpreta el texto libre que devuelve el LLM o el backend.
    pub fn from_texto(s: &str) -> Option<EstadoConvocatoria> {
        match s.trim().to_lowercase().as_str() {
            "activa" | "abierta" | "vigente" => Some(EstadoConvocatoria::Activa),
            "cerrada" | "vencida" | "finalizada" => Some(EstadoConvocatoria::Cerrada),
            "pendiente" | "proxima" | "próxima" => Some(EstadoConvocatoria::Pendiente),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoConvocatoria::Activa => "activa",
            EstadoConvocatoria::Cerrada => "cerrada",
            EstadoConvocatoria::Pendiente => "pendiente",
        }
    }

    /// Estado calculado a partir de las fechas de inicio y fin.
    /// Sin inicio se asume ya iniciada; sin fin se asume abierta.
    pub fn desde_fechas(inicio: Option<DateTime<Utc>>, fin: Option<DateTime<Utc>>, ahora: DateTime<Utc>) -> EstadoConvocatoria {
        if let Some(i) = inicio {
            if ahora < i {
                return EstadoConvocatoria::Pendiente;
            }
        }
        match fin {
            Some(f) if ahora > f => EstadoConvocatoria::Cerrada,
            _ => EstadoConvocatoria::Activa,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Convocatoria {
    pub id: Option<i64>,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    pub entidad: Option<String>,
    pub requisitos: Option<String>,
    pub presupuesto: Option<i64>,
    pub enlace: Option<String>,
    pub clasificacion: Option<String>,
    pub linea_oportunidad: Option<String>,
    pub palabras_clave: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub estado: Option<EstadoConvocatoria>,
    pub estado_manual: bool,
    pub ciudad: Option<String>,
    pub departamento: Option<String>,
}

impl Convocatoria {
    /// Estado vigente: el fijado manualmente si `estado_manual`, si no el calculado por fechas.
    pub fn estado_efectivo(&self, ahora: DateTime<Utc>) -> EstadoConvocatoria {
        if self.estado_manual {
            if let Some(e) = self.estado {
                return e;
            }
        }
        let inicio = self.fecha_inicio.as_deref().and_then(parse_fecha);
        let fin = self.fecha_fin.as_deref().and_then(parse_fecha);
        EstadoConvocatoria::desde_fechas(inicio, fin, ahora)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Promotor {
    pub id: Option<i64>,
    pub nombre: String,
    pub medio: Option<String>,
    pub descripcion: Option<String>,
    pub enlace: Option<String>,
    pub ciudad: Option<String>,
    pub departamento: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortafolioArco {
    pub id: Option<i64>,
    pub entidad: String,
    pub instrumento: Option<String>,
    pub objetivo: Option<String>,
    pub tipo_apoyo: Option<String>,
    pub poblacion_objetivo: Option<String>,
    pub enlace: Option<String>,
    pub departamento: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticuladorCompany {
    pub id: Option<i64>,
    pub articulador_id: i64,
    pub company_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticuladorConvocatoria {
    pub id: Option<i64>,
    pub articulador_id: i64,
    pub convocatoria_id: i64,
}

/// Registro mínimo del usuario que se guarda en la sesión (`auth_user`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsuarioSesion {
    pub id: Option<i64>,
    pub nombre: String,
    pub email: String,
    pub rol: Option<String>,
}
