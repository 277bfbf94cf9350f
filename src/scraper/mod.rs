//! Extracción del texto visible de una página y búsqueda de su logo.

use regex::Regex;
use reqwest::Url;
use std::future::Future;
use std::sync::OnceLock;

use crate::errores::ServiceError;
use crate::services::backend::error_de_status;
use crate::validacion::ErrorValidacion;

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; EcosistemaBot/1.0)";

/// Algo que entrega el texto de una URL.
pub trait FuenteTexto {
    fn obtener_texto(&self, url: &str) -> impl Future<Output = Result<String, ServiceError>>;
}

static RE_BLOQUES_OCULTOS: OnceLock<Regex> = OnceLock::new();
static RE_COMENTARIOS: OnceLock<Regex> = OnceLock::new();
static RE_SALTOS: OnceLock<Regex> = OnceLock::new();
static RE_ETIQUETAS: OnceLock<Regex> = OnceLock::new();
static RE_ENTIDAD_NUM: OnceLock<Regex> = OnceLock::new();

fn re(cell: &'static OnceLock<Regex>, patron: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(patron).expect("regex válida"))
}

const ENTIDADES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&ntilde;", "ñ"),
    ("&uuml;", "ü"),
    ("&Aacute;", "Á"),
    ("&Eacute;", "É"),
    ("&Iacute;", "Í"),
    ("&Oacute;", "Ó"),
    ("&Uacute;", "Ú"),
    ("&Ntilde;", "Ñ"),
    ("&Uuml;", "Ü"),
    ("&ordm;", "º"),
    ("&ordf;", "ª"),
    ("&deg;", "°"),
    ("&iexcl;", "¡"),
    ("&iquest;", "¿"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&ldquo;", "“"),
    ("&rdquo;", "”"),
    ("&lsquo;", "‘"),
    ("&rsquo;", "’"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&hellip;", "…"),
    ("&bull;", "•"),
    ("&middot;", "·"),
    ("&copy;", "©"),
    ("&reg;", "®"),
    ("&euro;", "€"),
];

fn decodificar_entidades(s: &str) -> String {
    let mut out = s.to_string();
    for &(ent, rep) in ENTIDADES {
        out = out.replace(ent, rep);
    }
    let out = re(&RE_ENTIDAD_NUM, r"&#(x[0-9a-fA-F]+|[0-9]+);").replace_all(&out, |caps: &regex::Captures| {
        let n = &caps[1];
        let code = if let Some(hex) = n.strip_prefix('x') { u32::from_str_radix(hex, 16).ok() } else { n.parse::<u32>().ok() };
        code.and_then(char::from_u32).map(|c| c.to_string()).unwrap_or_default()
    });
    // &amp; al final para no crear entidades nuevas
    out.replace("&amp;", "&")
}

/// Convierte HTML en texto plano línea a línea.
pub fn html_a_texto(html: &str) -> String {
    let sin_ocultos = re(
        &RE_BLOQUES_OCULTOS,
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<svg\b.*?</svg>|<template\b.*?</template>",
    )
    .replace_all(html, " ");
    let sin_comentarios = re(&RE_COMENTARIOS, r"(?s)<!--.*?-->").replace_all(&sin_ocultos, " ");
    let con_saltos = re(
        &RE_SALTOS,
        r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|section|article|header|footer|ul|ol|table|title|dd|dt)\s*>",
    )
    .replace_all(&sin_comentarios, "\n");
    let sin_etiquetas = re(&RE_ETIQUETAS, r"(?s)<[^>]*>").replace_all(&con_saltos, " ");
    let decodificado = decodificar_entidades(&sin_etiquetas);

    decodificado
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Acepta sólo URLs http(s) con host.
pub fn validar_url(url: &str) -> Result<Url, ServiceError> {
    let invalida = || ServiceError::Validacion(vec![ErrorValidacion::new("url", "La URL debe comenzar con http:// o https://")]);
    let u = Url::parse(url.trim()).map_err(|_| invalida())?;
    if !(u.scheme() == "http" || u.scheme() == "https") || u.host_str().is_none() {
        return Err(invalida());
    }
    Ok(u)
}

#[derive(Clone)]
pub struct PageScraper {
    http: reqwest::Client,
}

impl PageScraper {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl FuenteTexto for PageScraper {
    async fn obtener_texto(&self, url: &str) -> Result<String, ServiceError> {
        let u = validar_url(url)?;
        let resp = self.http.get(u).header(reqwest::header::USER_AGENT, USER_AGENT).send().await?;
        let status = resp.status();
        let html = resp.text().await?;
        if !status.is_success() {
            return Err(error_de_status(status, ""));
        }
        Ok(html_a_texto(&html))
    }
}

/// URLs candidatas para el logo de un sitio, en orden de preferencia.
pub fn candidatos_logo(url: &str) -> Result<Vec<String>, ServiceError> {
    let u = validar_url(url)?;
    let host = u.host_str().unwrap_or_default().to_string();
    let dominio = host.trim_start_matches("www.");
    let origen = match u.port() {
        Some(p) => format!("{}://{}:{}", u.scheme(), host, p),
        None => format!("{}://{}", u.scheme(), host),
    };
    Ok(vec![
        format!("https://logo.clearbit.com/{}", dominio),
        format!("{}/apple-touch-icon.png", origen),
        format!("{}/favicon.ico", origen),
        format!("https://www.google.com/s2/favicons?domain={}&sz=128", dominio),
    ])
}

/// Prueba los candidatos en orden y devuelve el primero que responde 200.
pub async fn extraer_logo(http: &reqwest::Client, candidatos: &[String]) -> Option<String> {
    for c in candidatos {
        match http.get(c).header(reqwest::header::USER_AGENT, USER_AGENT).send().await {
            Ok(r) if r.status() == reqwest::StatusCode::OK => return Some(c.clone()),
            Ok(r) => log::debug!("logo candidato {} respondió {}", c, r.status()),
            Err(e) => log::debug!("logo candidato {} falló: {}", c, e),
        }
    }
    None
}
