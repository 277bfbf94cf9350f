//! Validaciones de formularios previas al envío al backend.
//!
//! Todas las funciones devuelven la lista completa de errores encontrados en
//! lugar de detenerse en el primero, para poder mostrarlos junto a cada campo.

mod formulario;

pub use formulario::ConvocatoriaForm;

use serde::Serialize;

use crate::fechas::parse_fecha;
use crate::models::{Articulador, Company, Convocatoria};

/// Máximo que acepta la columna `presupuesto` del backend (INT de 32 bits).
pub const PRESUPUESTO_MAXIMO: i64 = i32::MAX as i64;
pub const PASSWORD_MIN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorValidacion {
    pub campo: String,
    pub mensaje: String,
}

impl ErrorValidacion {
    pub fn new(campo: &str, mensaje: &str) -> Self {
        Self { campo: campo.to_string(), mensaje: mensaje.to_string() }
    }
}

fn en_blanco(s: &str) -> bool {
    s.trim().is_empty()
}

/// `true` si parece un correo: algo antes de `@` y un punto después.
pub fn email_valido(email: &str) -> bool {
    let e = email.trim();
    match e.split_once('@') {
        Some((usuario, dominio)) => !usuario.is_empty() && dominio.contains('.') && !dominio.starts_with('.') && !dominio.ends_with('.'),
        None => false,
    }
}

pub fn enlace_valido(enlace: &str) -> bool {
    let e = enlace.trim().to_lowercase();
    (e.starts_with("http://") || e.starts_with("https://")) && e.len() > "https://".len()
}

fn validar_coordenadas(latitud: Option<f64>, longitud: Option<f64>, errores: &mut Vec<ErrorValidacion>) {
    if let Some(lat) = latitud {
        if !(-90.0..=90.0).contains(&lat) {
            errores.push(ErrorValidacion::new("latitud", "La latitud debe estar entre -90 y 90"));
        }
    }
    if let Some(lng) = longitud {
        if !(-180.0..=180.0).contains(&lng) {
            errores.push(ErrorValidacion::new("longitud", "La longitud debe estar entre -180 y 180"));
        }
    }
}

fn validar_email_opcional(email: &Option<String>, errores: &mut Vec<ErrorValidacion>) {
    if let Some(e) = email.as_deref() {
        if !en_blanco(e) && !email_valido(e) {
            errores.push(ErrorValidacion::new("email", "El correo electrónico no es válido"));
        }
    }
}

fn resultado(errores: Vec<ErrorValidacion>) -> Result<(), Vec<ErrorValidacion>> {
    if errores.is_empty() { Ok(()) } else { Err(errores) }
}

pub fn validar_convocatoria(c: &Convocatoria) -> Result<(), Vec<ErrorValidacion>> {
    let mut errores = Vec::new();

    if en_blanco(&c.titulo) {
        errores.push(ErrorValidacion::new("titulo", "El título es obligatorio"));
    }

    let inicio = c.fecha_inicio.as_deref().filter(|s| !en_blanco(s));
    let fin = c.fecha_fin.as_deref().filter(|s| !en_blanco(s));
    let inicio_dt = inicio.and_then(parse_fecha);
    let fin_dt = fin.and_then(parse_fecha);
    if inicio.is_some() && inicio_dt.is_none() {
        errores.push(ErrorValidacion::new("fechaInicio", "La fecha de inicio no es válida"));
    }
    if fin.is_some() && fin_dt.is_none() {
        errores.push(ErrorValidacion::new("fechaFin", "La fecha de cierre no es válida"));
    }
    if let (Some(i), Some(f)) = (inicio_dt, fin_dt) {
        if f <= i {
            errores.push(ErrorValidacion::new("fechaFin", "La fecha de cierre debe ser posterior a la fecha de inicio"));
        }
    }

    if let Some(p) = c.presupuesto {
        if p < 0 {
            errores.push(ErrorValidacion::new("presupuesto", "El presupuesto no puede ser negativo"));
        } else if p > PRESUPUESTO_MAXIMO {
            errores.push(ErrorValidacion::new("presupuesto", "El presupuesto excede el máximo permitido (2.147.483.647)"));
        }
    }

    if let Some(e) = c.enlace.as_deref() {
        if !en_blanco(e) && !enlace_valido(e) {
            errores.push(ErrorValidacion::new("enlace", "El enlace debe comenzar con http:// o https://"));
        }
    }

    resultado(errores)
}

pub fn validar_company(c: &Company) -> Result<(), Vec<ErrorValidacion>> {
    let mut errores = Vec::new();
    if en_blanco(&c.nombre) {
        errores.push(ErrorValidacion::new("nombre", "El nombre de la empresa es obligatorio"));
    }
    validar_email_opcional(&c.email, &mut errores);
    if let Some(w) = c.sitio_web.as_deref() {
        if !en_blanco(w) && !enlace_valido(w) {
            errores.push(ErrorValidacion::new("sitioWeb", "El sitio web debe comenzar con http:// o https://"));
        }
    }
    validar_coordenadas(c.latitud, c.longitud, &mut errores);
    resultado(errores)
}

pub fn validar_articulador(a: &Articulador) -> Result<(), Vec<ErrorValidacion>> {
    let mut errores = Vec::new();
    if en_blanco(&a.nombre) {
        errores.push(ErrorValidacion::new("nombre", "El nombre del articulador es obligatorio"));
    }
    validar_email_opcional(&a.email, &mut errores);
    validar_coordenadas(a.latitud, a.longitud, &mut errores);
    resultado(errores)
}

pub fn validar_login(usuario: &str, password: &str) -> Result<(), Vec<ErrorValidacion>> {
    let mut errores = Vec::new();
    if en_blanco(usuario) {
        errores.push(ErrorValidacion::new("email", "El usuario es obligatorio"));
    }
    if password.is_empty() {
        errores.push(ErrorValidacion::new("password", "La contraseña es obligatoria"));
    }
    resultado(errores)
}

pub fn validar_registro(nombre: &str, email: &str, password: &str) -> Result<(), Vec<ErrorValidacion>> {
    let mut errores = Vec::new();
    if en_blanco(nombre) {
        errores.push(ErrorValidacion::new("nombre", "El nombre es obligatorio"));
    }
    if en_blanco(email) {
        errores.push(ErrorValidacion::new("email", "El correo electrónico es obligatorio"));
    } else if !email_valido(email) {
        errores.push(ErrorValidacion::new("email", "El correo electrónico no es válido"));
    }
    if password.chars().count() < PASSWORD_MIN {
        errores.push(ErrorValidacion::new("password", "La contraseña debe tener al menos 6 caracteres"));
    }
    resultado(errores)
}
