//! Agrupación de los actores del ecosistema por departamento para el mapa.

mod departamentos;

pub use departamentos::{buscar_departamento, normalizar_nombre, Departamento, DEPARTAMENTOS, UMBRAL_SIMILITUD};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::models::{Articulador, Company, Convocatoria, Promotor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoItem {
    Company,
    Articulador,
    Convocatoria,
    Promotor,
}

impl TipoItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoItem::Company => "company",
            TipoItem::Articulador => "articulador",
            TipoItem::Convocatoria => "convocatoria",
            TipoItem::Promotor => "promotor",
        }
    }
}

/// Un punto del mapa, sea cual sea la entidad de origen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemMapItem {
    pub id: Option<i64>,
    pub tipo: TipoItem,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub departamento: Option<String>,
    pub ciudad: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub enlace: Option<String>,
}

impl From<&Company> for EcosystemMapItem {
    fn from(c: &Company) -> Self {
        EcosystemMapItem {
            id: c.id,
            tipo: TipoItem::Company,
            nombre: c.nombre.clone(),
            descripcion: c.descripcion.clone(),
            departamento: c.departamento.clone(),
            ciudad: c.ciudad.clone(),
            latitud: c.latitud,
            longitud: c.longitud,
            enlace: c.sitio_web.clone(),
        }
    }
}

impl From<&Articulador> for EcosystemMapItem {
    fn from(a: &Articulador) -> Self {
        EcosystemMapItem {
            id: a.id,
            tipo: TipoItem::Articulador,
            nombre: a.nombre.clone(),
            descripcion: a.descripcion.clone(),
            departamento: a.departamento.clone(),
            ciudad: a.ciudad.clone(),
            latitud: a.latitud,
            longitud: a.longitud,
            enlace: a.sitio_web.clone(),
        }
    }
}

impl From<&Convocatoria> for EcosystemMapItem {
    fn from(c: &Convocatoria) -> Self {
        EcosystemMapItem {
            id: c.id,
            tipo: TipoItem::Convocatoria,
            nombre: c.titulo.clone(),
            descripcion: c.descripcion.clone(),
            departamento: c.departamento.clone(),
            ciudad: c.ciudad.clone(),
            latitud: None,
            longitud: None,
            enlace: c.enlace.clone(),
        }
    }
}

impl From<&Promotor> for EcosystemMapItem {
    fn from(p: &Promotor) -> Self {
        EcosystemMapItem {
            id: p.id,
            tipo: TipoItem::Promotor,
            nombre: p.nombre.clone(),
            descripcion: p.descripcion.clone(),
            departamento: p.departamento.clone(),
            ciudad: p.ciudad.clone(),
            latitud: p.latitud,
            longitud: p.longitud,
            enlace: p.enlace.clone(),
        }
    }
}

impl EcosystemMapItem {
    fn coordenadas(&self) -> Option<(f64, f64)> {
        match (self.latitud, self.longitud) {
            (Some(la), Some(lo)) if (-90.0..=90.0).contains(&la) && (-180.0..=180.0).contains(&lo) => Some((la, lo)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrupoDepartamento {
    pub departamento: String,
    pub latitud: f64,
    pub longitud: f64,
    pub total: usize,
    pub conteo_por_tipo: BTreeMap<TipoItem, usize>,
    pub items: Vec<EcosystemMapItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapaEcosistema {
    pub grupos: Vec<GrupoDepartamento>,
    pub sin_ubicacion: Vec<EcosystemMapItem>,
    pub total: usize,
}

/// Marcadores por anillo alrededor del centroide.
const MARCADORES_POR_ANILLO: usize = 8;
/// Separación en grados entre anillos consecutivos.
const RADIO_ANILLO: f64 = 0.04;

/// Posición del marcador `indice` de `total` que comparten un centroide.
/// Un único marcador cae sobre el centroide; el resto se reparte en anillos.
pub fn posicion_marcador(centro: (f64, f64), indice: usize, total: usize) -> (f64, f64) {
    if total <= 1 {
        return centro;
    }
    let anillo = indice / MARCADORES_POR_ANILLO;
    let en_anillo = (total - anillo * MARCADORES_POR_ANILLO).min(MARCADORES_POR_ANILLO);
    let slot = indice % MARCADORES_POR_ANILLO;
    // desfase por anillo para que los radios no queden alineados
    let angulo = 2.0 * PI * slot as f64 / en_anillo as f64 + anillo as f64 * PI / MARCADORES_POR_ANILLO as f64;
    let radio = RADIO_ANILLO * (anillo + 1) as f64;
    (centro.0 + radio * angulo.sin(), centro.1 + radio * angulo.cos())
}

fn distancia2(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

/// Departamento cuyo centroide está más cerca de las coordenadas.
fn departamento_mas_cercano(coord: (f64, f64)) -> &'static Departamento {
    let mut mejor = &DEPARTAMENTOS[0];
    for d in DEPARTAMENTOS.iter().skip(1) {
        if distancia2(coord, (d.latitud, d.longitud)) < distancia2(coord, (mejor.latitud, mejor.longitud)) {
            mejor = d;
        }
    }
    mejor
}

/// Agrupa los items por departamento (ordenados por nombre) y asigna posición a
/// los que no traen coordenadas propias.
pub fn agrupar_por_departamento(items: Vec<EcosystemMapItem>) -> MapaEcosistema {
    let total = items.len();
    let mut por_depto: BTreeMap<&'static str, (&'static Departamento, Vec<EcosystemMapItem>)> = BTreeMap::new();
    let mut sin_ubicacion = Vec::new();

    for mut item in items {
        let resuelto = item.departamento.as_deref().and_then(buscar_departamento);
        let depto = match (resuelto, item.coordenadas()) {
            (Some(d), _) => d,
            (None, Some(coord)) => departamento_mas_cercano(coord),
            (None, None) => {
                log::debug!("{} '{}' sin departamento reconocible", item.tipo.as_str(), item.nombre);
                sin_ubicacion.push(item);
                continue;
            }
        };
        item.departamento = Some(depto.nombre.to_string());
        por_depto.entry(depto.nombre).or_insert_with(|| (depto, Vec::new())).1.push(item);
    }

    let mut grupos = por_depto
        .into_values()
        .map(|(depto, mut items)| {
            let centro = (depto.latitud, depto.longitud);
            let sin_coord = items.iter().filter(|i| i.coordenadas().is_none()).count();
            for (k, item) in items.iter_mut().filter(|i| i.coordenadas().is_none()).enumerate() {
                let (la, lo) = posicion_marcador(centro, k, sin_coord);
                item.latitud = Some(la);
                item.longitud = Some(lo);
            }
            let mut conteo_por_tipo = BTreeMap::new();
            for item in &items {
                *conteo_por_tipo.entry(item.tipo).or_insert(0) += 1;
            }
            GrupoDepartamento {
                departamento: depto.nombre.to_string(),
                latitud: depto.latitud,
                longitud: depto.longitud,
                total: items.len(),
                conteo_por_tipo,
                items,
            }
        })
        .collect::<Vec<_>>();
    // BTreeMap ordena por bytes; el orden visible es sin tildes
    grupos.sort_by_key(|g| normalizar_nombre(&g.departamento));

    MapaEcosistema { grupos, sin_ubicacion, total }
}
