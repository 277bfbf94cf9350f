use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{validar_convocatoria, ErrorValidacion};
use crate::models::{Convocatoria, EstadoConvocatoria};

/// Estado del formulario de convocatoria tal como lo edita el usuario: todo texto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvocatoriaForm {
    pub titulo: String,
    pub descripcion: String,
    pub categoria: String,
    pub entidad: String,
    pub requisitos: String,
    pub presupuesto: String,
    pub enlace: String,
    pub clasificacion: String,
    pub linea_oportunidad: String,
    pub palabras_clave: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub estado: String,
    pub estado_manual: bool,
}

fn opcional(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

static RE_DECIMALES: OnceLock<Regex> = OnceLock::new();
static RE_MILES: OnceLock<Regex> = OnceLock::new();

const MSG_NO_ENTERO: &str = "El presupuesto debe ser un número entero";
const MSG_FUERA_DE_RANGO: &str = "El presupuesto excede el máximo permitido (2.147.483.647)";

/// Convierte "$ 1.500.000", "1,500,000" o "1.500.000,50" en un entero.
/// Los centavos (uno o dos dígitos tras el último separador) se descartan; los
/// separadores de miles sólo se aceptan entre grupos de tres dígitos.
/// `Ok(None)` si está vacío.
pub(crate) fn parse_presupuesto(s: &str) -> Result<Option<i64>, ErrorValidacion> {
    let limpio: String = s.chars().filter(|c| !matches!(c, '$' | ' ' | '\u{a0}')).collect();
    if limpio.is_empty() {
        return Ok(None);
    }
    let (signo, cuerpo) = match limpio.strip_prefix('-') {
        Some(resto) => ("-", resto),
        None => ("", limpio.as_str()),
    };

    let decimales = RE_DECIMALES.get_or_init(|| Regex::new(r"^(\d[\d.,]*)[.,]\d{1,2}$").expect("regex válida"));
    let entero = match decimales.captures(cuerpo).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => cuerpo,
    };

    let digitos: String = if entero.chars().all(|c| c.is_ascii_digit()) {
        entero.to_string()
    } else {
        let miles = RE_MILES.get_or_init(|| Regex::new(r"^\d{1,3}(?:\.\d{3})+$|^\d{1,3}(?:,\d{3})+$").expect("regex válida"));
        if !miles.is_match(entero) {
            return Err(ErrorValidacion::new("presupuesto", MSG_NO_ENTERO));
        }
        entero.chars().filter(|c| c.is_ascii_digit()).collect()
    };
    if digitos.is_empty() {
        return Err(ErrorValidacion::new("presupuesto", MSG_NO_ENTERO));
    }

    match format!("{}{}", signo, digitos).parse::<i64>() {
        Ok(v) => Ok(Some(v)),
        // sólo dígitos pero más de los que caben en i64
        Err(_) => Err(ErrorValidacion::new("presupuesto", MSG_FUERA_DE_RANGO)),
    }
}

impl ConvocatoriaForm {
    /// Valida el formulario y, si es correcto, lo convierte en la entidad que se envía al backend.
    pub fn a_convocatoria(&self) -> Result<Convocatoria, Vec<ErrorValidacion>> {
        let presupuesto = parse_presupuesto(&self.presupuesto).map_err(|e| vec![e])?;
        let c = Convocatoria {
            id: None,
            titulo: self.titulo.trim().to_string(),
            descripcion: opcional(&self.descripcion),
            categoria: opcional(&self.categoria),
            entidad: opcional(&self.entidad),
            requisitos: opcional(&self.requisitos),
            presupuesto,
            enlace: opcional(&self.enlace),
            clasificacion: opcional(&self.clasificacion),
            linea_oportunidad: opcional(&self.linea_oportunidad),
            palabras_clave: opcional(&self.palabras_clave),
            fecha_inicio: opcional(&self.fecha_inicio),
            fecha_fin: opcional(&self.fecha_fin),
            estado: EstadoConvocatoria::from_texto(&self.estado),
            estado_manual: self.estado_manual,
            ciudad: None,
            departamento: None,
        };
        validar_convocatoria(&c)?;
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presupuesto_con_formato_local() {
        assert_eq!(parse_presupuesto("$ 1.500.000").unwrap(), Some(1_500_000));
        assert_eq!(parse_presupuesto("").unwrap(), None);
        assert!(parse_presupuesto("mil pesos").is_err());
    }

    #[test]
    fn presupuesto_con_centavos_los_descarta() {
        assert_eq!(parse_presupuesto("1500000.50").unwrap(), Some(1_500_000));
        assert_eq!(parse_presupuesto("1.500.000,50").unwrap(), Some(1_500_000));
        assert_eq!(parse_presupuesto("1,500,000.5").unwrap(), Some(1_500_000));
        assert_eq!(parse_presupuesto("25000000.00").unwrap(), Some(25_000_000));
        assert_eq!(parse_presupuesto("1.500").unwrap(), Some(1_500));

        let form = ConvocatoriaForm {
            titulo: "Convocatoria de innovación".into(),
            presupuesto: "25000000.00".into(),
            ..Default::default()
        };
        assert_eq!(form.a_convocatoria().unwrap().presupuesto, Some(25_000_000));
    }

    #[test]
    fn separadores_mal_agrupados_no_son_entero() {
        for s in ["15.00.000", "1,5000", "1.500,000"] {
            assert_eq!(parse_presupuesto(s).unwrap_err().mensaje, MSG_NO_ENTERO, "{}", s);
        }
    }

    #[test]
    fn signo_sin_digitos_no_es_entero() {
        assert_eq!(parse_presupuesto("-").unwrap_err().mensaje, MSG_NO_ENTERO);
        assert_eq!(parse_presupuesto("-$").unwrap_err().mensaje, MSG_NO_ENTERO);
        assert_eq!(parse_presupuesto("99999999999999999999999").unwrap_err().mensaje, MSG_FUERA_DE_RANGO);
    }

    #[test]
    fn presupuesto_mayor_a_int32_se_rechaza() {
        let form = ConvocatoriaForm {
            titulo: "Convocatoria de innovación".into(),
            presupuesto: "2147483648".into(),
            ..Default::default()
        };
        let errs = form.a_convocatoria().unwrap_err();
        assert_eq!(errs[0].campo, "presupuesto");

        let enorme = ConvocatoriaForm { presupuesto: "99999999999999999999999".into(), ..form };
        assert_eq!(enorme.a_convocatoria().unwrap_err()[0].campo, "presupuesto");
    }

    #[test]
    fn formulario_completo() {
        let form = ConvocatoriaForm {
            titulo: " Reto TIC ".into(),
            presupuesto: "2147483647".into(),
            fecha_inicio: "2025-01-01".into(),
            fecha_fin: "2025-03-01".into(),
            estado: "activa".into(),
            ..Default::default()
        };
        let c = form.a_convocatoria().unwrap();
        assert_eq!(c.titulo, "Reto TIC");
        assert_eq!(c.presupuesto, Some(2_147_483_647));
        assert_eq!(c.estado, Some(EstadoConvocatoria::Activa));
        assert!(c.descripcion.is_none());
    }
}
