//! Utilidades de fechas: conversión tolerante a ISO 8601 y parseo de los
//! formatos que aparecen en el backend y en el texto extraído de las páginas.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Valores que el frontend y el LLM usan para "sin fecha".
const VALORES_VACIOS: [&str; 4] = ["null", "undefined", "", "no especificada"];

/// Formatea como lo hace `Date.prototype.toISOString` (milisegundos y sufijo `Z`).
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Intenta interpretar una fecha en los formatos conocidos.
pub fn parse_fecha(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(n.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        }
    }
    None
}

/// Devuelve la fecha en ISO 8601 o, si el valor es vacío/"null"/"No especificada"
/// o no se puede interpretar, la fecha de respaldo en ISO.
pub fn safe_to_iso_string(valor: Option<&str>, respaldo: DateTime<Utc>) -> String {
    let Some(v) = valor else {
        return to_iso_string(&respaldo);
    };
    let normalizado = v.trim().to_lowercase();
    if VALORES_VACIOS.contains(&normalizado.as_str()) {
        return to_iso_string(&respaldo);
    }
    match parse_fecha(v) {
        Some(dt) => to_iso_string(&dt),
        None => to_iso_string(&respaldo),
    }
}
