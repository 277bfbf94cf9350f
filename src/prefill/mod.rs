//! Prellenado del formulario de convocatoria a partir del texto de una página.
//!
//! Flujo: texto extraído → prompt al modelo → bloque JSON de la respuesta →
//! formulario. Si la respuesta no contiene JSON interpretable se recurre a
//! heurísticas simples sobre el texto original; ese fallo nunca llega al usuario.
//! Los errores de red o del modelo sí se propagan.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::errores::ServiceError;
use crate::fechas::safe_to_iso_string;
use crate::gemini::ModeloTexto;
use crate::models::EstadoConvocatoria;
use crate::scraper::FuenteTexto;
use crate::validacion::ConvocatoriaForm;

/// Caracteres del texto de la página que se incluyen en el prompt.
pub const MAX_TEXTO_PROMPT: usize = 15_000;
pub const MAX_DESCRIPCION_HEURISTICA: usize = 500;
pub const TITULO_SIN_DATOS: &str = "Convocatoria sin título";
pub const PLACEHOLDER_CATEGORIA: &str = "Por definir";
pub const PLACEHOLDER_ENTIDAD: &str = "Por definir";
pub const PLACEHOLDER_REQUISITOS: &str = "Consultar requisitos en el enlace de la convocatoria";
/// Duración supuesta cuando el modelo no encuentra fecha de cierre.
pub const DIAS_VIGENCIA_POR_DEFECTO: i64 = 30;

static RE_BLOQUE_JSON: OnceLock<Regex> = OnceLock::new();

/// Acepta `"a"`, `["a", "b"]` o `null` y siempre produce una lista.
fn lista_flexible<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(valor_a_lista(&v))
}

fn valor_a_lista(v: &Value) -> Vec<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|i| match i {
                Value::String(s) => Some(s.trim().to_string()),
                // fechas como {"tipo": "cierre", "fecha": "..."}
                Value::Object(o) => o.get("fecha").and_then(|f| f.as_str()).map(|s| s.to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Acepta texto, número, lista (se une con ", ") o `null`.
fn texto_flexible<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    let texto = match v {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => valor_a_lista(&v).join(", "),
        Value::Null | Value::Object(_) => return Ok(None),
    };
    Ok(if texto.trim().is_empty() { None } else { Some(texto) })
}

/// Un `datosConvocatoria` que no es objeto (o no encaja) cuenta como vacío.
fn datos_flexibles<'de, D>(d: D) -> Result<DatosConvocatoria, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    match v {
        Value::Object(_) => Ok(serde_json::from_value(v).unwrap_or_default()),
        _ => Ok(DatosConvocatoria::default()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatosConvocatoria {
    #[serde(deserialize_with = "texto_flexible")]
    pub titulo: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub descripcion: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub categoria: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub entidad: Option<String>,
    #[serde(deserialize_with = "lista_flexible")]
    pub requisitos: Vec<String>,
    pub presupuesto: Option<Value>,
    #[serde(deserialize_with = "texto_flexible")]
    pub enlace: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub clasificacion: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub linea_oportunidad: Option<String>,
    #[serde(deserialize_with = "lista_flexible")]
    pub palabras_clave: Vec<String>,
}

/// Objeto JSON que se le pide al modelo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalisisConvocatoria {
    #[serde(deserialize_with = "texto_flexible")]
    pub estado: Option<String>,
    #[serde(deserialize_with = "texto_flexible")]
    pub justificacion: Option<String>,
    #[serde(deserialize_with = "lista_flexible")]
    pub fechas_encontradas: Vec<String>,
    pub confianza: Option<Value>,
    #[serde(deserialize_with = "datos_flexibles")]
    pub datos_convocatoria: DatosConvocatoria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrigenPrefill {
    Llm,
    Heuristica,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultadoPrefill {
    pub formulario: ConvocatoriaForm,
    pub analisis: Option<AnalisisConvocatoria>,
    pub origen: OrigenPrefill,
}

pub fn construir_prompt(texto: &str, url: &str) -> String {
    let recortado: String = texto.chars().take(MAX_TEXTO_PROMPT).collect();
    format!(
        "Analiza el siguiente texto extraído de la página {url} y determina si corresponde a una convocatoria \
vigente. Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional, con esta estructura:\n\
{{\n  \"estado\": \"activa\" | \"cerrada\" | \"pendiente\",\n  \"justificacion\": \"...\",\n  \
\"fechasEncontradas\": [\"YYYY-MM-DD de apertura\", \"YYYY-MM-DD de cierre\"],\n  \"confianza\": 0.0,\n  \
\"datosConvocatoria\": {{\n    \"titulo\": \"...\",\n    \"descripcion\": \"...\",\n    \"categoria\": \"...\",\n    \
\"entidad\": \"...\",\n    \"requisitos\": [\"...\"],\n    \"presupuesto\": 0,\n    \"enlace\": \"...\",\n    \
\"clasificacion\": \"...\",\n    \"lineaOportunidad\": \"...\",\n    \"palabrasClave\": \"...\"\n  }}\n}}\n\
Si un dato no aparece en el texto usa \"No especificada\".\n\nTEXTO:\n{recortado}"
    )
}

/// Primer bloque delimitado por llaves (desde la primera `{` hasta la última `}`).
pub fn extraer_bloque_json(respuesta: &str) -> Option<&str> {
    let re = RE_BLOQUE_JSON.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("regex válida"));
    re.find(respuesta.trim()).map(|m| m.as_str())
}

/// `None` si la respuesta no contiene un objeto JSON interpretable.
pub fn parsear_respuesta(respuesta: &str) -> Option<AnalisisConvocatoria> {
    let bloque = extraer_bloque_json(respuesta)?;
    match serde_json::from_str::<AnalisisConvocatoria>(bloque) {
        Ok(a) => Some(a),
        Err(e) => {
            log::warn!("respuesta del modelo no es JSON válido: {}", e);
            None
        }
    }
}

fn texto_util(s: &Option<String>) -> String {
    match s.as_deref().map(str::trim) {
        Some(t) if !t.eq_ignore_ascii_case("no especificada") && !t.eq_ignore_ascii_case("null") => t.to_string(),
        _ => String::new(),
    }
}

fn presupuesto_a_texto(v: &Option<Value>) -> String {
    match v {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| (f.trunc() as i64).to_string()).unwrap_or_default(),
        },
        Some(Value::String(s)) => texto_util(&Some(s.clone())),
        _ => String::new(),
    }
}

/// Llena el formulario con lo que devolvió el modelo.
pub fn formulario_desde_analisis(a: &AnalisisConvocatoria, url: &str, ahora: DateTime<Utc>) -> ConvocatoriaForm {
    let d = &a.datos_convocatoria;
    let enlace = match texto_util(&d.enlace) {
        e if e.is_empty() => url.to_string(),
        e => e,
    };
    let fin_por_defecto = ahora + Duration::days(DIAS_VIGENCIA_POR_DEFECTO);
    ConvocatoriaForm {
        titulo: texto_util(&d.titulo),
        descripcion: texto_util(&d.descripcion),
        categoria: texto_util(&d.categoria),
        entidad: texto_util(&d.entidad),
        requisitos: d.requisitos.join("\n"),
        presupuesto: presupuesto_a_texto(&d.presupuesto),
        enlace,
        clasificacion: texto_util(&d.clasificacion),
        linea_oportunidad: texto_util(&d.linea_oportunidad),
        palabras_clave: d.palabras_clave.join(", "),
        fecha_inicio: safe_to_iso_string(a.fechas_encontradas.first().map(String::as_str), ahora),
        fecha_fin: safe_to_iso_string(a.fechas_encontradas.get(1).map(String::as_str), fin_por_defecto),
        estado: a
            .estado
            .as_deref()
            .and_then(EstadoConvocatoria::from_texto)
            .map(|e| e.as_str().to_string())
            .unwrap_or_default(),
        estado_manual: false,
    }
}

/// Título heurístico: primera línea con longitud (recortada) estrictamente entre 10 y 200.
pub fn titulo_heuristico(texto: &str) -> Option<String> {
    texto
        .lines()
        .map(str::trim)
        .find(|l| {
            let n = l.chars().count();
            n > 10 && n < 200
        })
        .map(|l| l.to_string())
}

/// Formulario mínimo cuando la respuesta del modelo no sirve.
pub fn formulario_heuristico(texto: &str, url: &str) -> ConvocatoriaForm {
    let mut descripcion: String = texto.chars().take(MAX_DESCRIPCION_HEURISTICA).collect();
    descripcion.push_str("...");
    ConvocatoriaForm {
        titulo: titulo_heuristico(texto).unwrap_or_else(|| TITULO_SIN_DATOS.to_string()),
        descripcion,
        categoria: PLACEHOLDER_CATEGORIA.to_string(),
        entidad: PLACEHOLDER_ENTIDAD.to_string(),
        requisitos: PLACEHOLDER_REQUISITOS.to_string(),
        enlace: url.to_string(),
        ..Default::default()
    }
}

/// Pide el análisis al modelo y arma el formulario (o la versión heurística).
pub async fn prellenar<M: ModeloTexto>(modelo: &M, texto: &str, url: &str, ahora: DateTime<Utc>) -> Result<ResultadoPrefill, ServiceError> {
    let respuesta = modelo.generar(&construir_prompt(texto, url)).await?;
    match parsear_respuesta(&respuesta) {
        Some(analisis) => Ok(ResultadoPrefill {
            formulario: formulario_desde_analisis(&analisis, url, ahora),
            analisis: Some(analisis),
            origen: OrigenPrefill::Llm,
        }),
        None => {
            log::info!("usando heurística para prellenar {}", url);
            Ok(ResultadoPrefill { formulario: formulario_heuristico(texto, url), analisis: None, origen: OrigenPrefill::Heuristica })
        }
    }
}

/// Scraper + modelo: el flujo completo a partir de una URL.
pub async fn prellenar_desde_url<F: FuenteTexto, M: ModeloTexto>(fuente: &F, modelo: &M, url: &str) -> Result<ResultadoPrefill, ServiceError> {
    let texto = fuente.obtener_texto(url).await?;
    prellenar(modelo, &texto, url, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn bloque_json_dentro_de_prosa() {
        let respuesta = "Claro, aquí está el análisis:\n```json\n{\"estado\":\"activa\",\"confianza\":0.9,\"datosConvocatoria\":{\"titulo\":\"Reto\"}}\n```\nEspero que sirva.";
        let bloque = extraer_bloque_json(respuesta).unwrap();
        let v: Value = serde_json::from_str(bloque).unwrap();
        assert_eq!(v, json!({"estado": "activa", "confianza": 0.9, "datosConvocatoria": {"titulo": "Reto"}}));
    }

    #[test]
    fn requisitos_como_texto_o_lista() {
        let a: AnalisisConvocatoria =
            serde_json::from_str(r#"{"datosConvocatoria": {"requisitos": "Ser pyme", "palabrasClave": ["tic", "ia"]}}"#).unwrap();
        assert_eq!(a.datos_convocatoria.requisitos, vec!["Ser pyme"]);
        assert_eq!(a.datos_convocatoria.palabras_clave, vec!["tic", "ia"]);
    }

    #[test]
    fn sin_json_es_none() {
        assert!(parsear_respuesta("No pude analizar la página").is_none());
        assert!(parsear_respuesta("{esto no es json}").is_none());
    }

    #[test]
    fn formulario_desde_analisis_completo() {
        let ahora = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let a: AnalisisConvocatoria = serde_json::from_value(json!({
            "estado": "Activa",
            "fechasEncontradas": ["2025-01-01", "No especificada"],
            "datosConvocatoria": {
                "titulo": "Fondo TIC",
                "presupuesto": 150000000,
                "requisitos": ["Ser empresa", "Tener NIT"],
                "enlace": "No especificada"
            }
        }))
        .unwrap();
        let f = formulario_desde_analisis(&a, "https://fondo.gov.co/x", ahora);
        assert_eq!(f.titulo, "Fondo TIC");
        assert_eq!(f.presupuesto, "150000000");
        assert_eq!(f.requisitos, "Ser empresa\nTener NIT");
        assert_eq!(f.enlace, "https://fondo.gov.co/x");
        assert_eq!(f.estado, "activa");
        assert_eq!(f.fecha_inicio, "2025-01-01T00:00:00.000Z");
        assert_eq!(f.fecha_fin, "2025-02-09T00:00:00.000Z");
    }

    #[test]
    fn datos_nulos_no_descartan_el_analisis() {
        let a = parsear_respuesta(r#"{"estado":"cerrada","datosConvocatoria":null}"#).unwrap();
        assert_eq!(a.estado.as_deref(), Some("cerrada"));
        assert_eq!(a.datos_convocatoria, DatosConvocatoria::default());
    }

    #[test]
    fn campos_de_texto_como_lista_o_numero() {
        let a = parsear_respuesta(
            r#"{"estado":"activa","justificacion":["abierta","sin fecha de cierre"],
                "datosConvocatoria":{"titulo":"T","lineaOportunidad":["A","B"],"clasificacion":3,"entidad":null}}"#,
        )
        .unwrap();
        assert_eq!(a.estado.as_deref(), Some("activa"));
        assert_eq!(a.justificacion.as_deref(), Some("abierta, sin fecha de cierre"));
        assert_eq!(a.datos_convocatoria.titulo.as_deref(), Some("T"));
        assert_eq!(a.datos_convocatoria.linea_oportunidad.as_deref(), Some("A, B"));
        assert_eq!(a.datos_convocatoria.clasificacion.as_deref(), Some("3"));
        assert!(a.datos_convocatoria.entidad.is_none());
    }

    #[test]
    fn presupuesto_con_centavos_llega_entero_al_formulario() {
        let ahora = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let a = parsear_respuesta(r#"{"datosConvocatoria":{"titulo":"Fondo TIC","presupuesto":"25000000.00"}}"#).unwrap();
        let f = formulario_desde_analisis(&a, "https://fondo.gov.co", ahora);
        assert_eq!(f.a_convocatoria().unwrap().presupuesto, Some(25_000_000));
    }

    #[test]
    fn titulo_heuristico_respeta_limites() {
        let texto = "Inicio\n          \nCorto aquí\nConvocatoria Nacional de Innovación 2025\nOtra línea larga de texto";
        // "Corto aquí" tiene exactamente 10 caracteres: no cuenta
        assert_eq!(titulo_heuristico(texto).as_deref(), Some("Convocatoria Nacional de Innovación 2025"));
        let largo = "x".repeat(200);
        assert_eq!(titulo_heuristico(&largo), None);
    }

    #[test]
    fn heuristica_trunca_descripcion() {
        let texto = "Convocatoria de prueba larga\n".repeat(40);
        let f = formulario_heuristico(&texto, "https://a.co");
        assert_eq!(f.descripcion.chars().count(), MAX_DESCRIPCION_HEURISTICA + 3);
        assert!(f.descripcion.ends_with("..."));
        assert_eq!(f.categoria, PLACEHOLDER_CATEGORIA);
        assert_eq!(f.enlace, "https://a.co");
    }

    #[test]
    fn heuristica_siempre_agrega_puntos_suspensivos() {
        let f = formulario_heuristico("Texto breve de la convocatoria", "https://a.co");
        assert_eq!(f.descripcion, "Texto breve de la convocatoria...");
    }

    #[test]
    fn prompt_recorta_texto() {
        let texto = "a".repeat(MAX_TEXTO_PROMPT + 100);
        let p = construir_prompt(&texto, "https://a.co");
        assert!(p.contains("datosConvocatoria"));
        assert!(p.ends_with(&"a".repeat(10)));
        assert!(!p.contains(&"a".repeat(MAX_TEXTO_PROMPT + 1)));
    }
}
