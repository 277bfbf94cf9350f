//! Rutas de los recursos REST del backend.
//!
//! Conviven dos juegos de rutas: las históricas (`/Companies`, ...) y las de
//! "nuevas entidades" (`/backend/empresas`, ...). Cuál es la canónica depende
//! del despliegue del backend, así que se elige por configuración.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSet {
    Legacy,
    Nuevas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurso {
    Companies,
    Convocatorias,
    Promotores,
    Articuladores,
    PortafolioArco,
    ArticuladorCompany,
    ArticuladorConvocatoria,
}

impl Recurso {
    pub fn path(&self, set: EndpointSet) -> &'static str {
        match set {
            EndpointSet::Legacy => match self {
                Recurso::Companies => "Companies",
                Recurso::Convocatorias => "Convocatorias",
                Recurso::Promotores => "Promotores",
                Recurso::Articuladores => "Articuladores",
                Recurso::PortafolioArco => "PortafolioArco",
                Recurso::ArticuladorCompany => "ArticuladorCompany",
                Recurso::ArticuladorConvocatoria => "ArticuladorConvocatoria",
            },
            EndpointSet::Nuevas => match self {
                Recurso::Companies => "backend/empresas",
                Recurso::Convocatorias => "backend/convocatorias",
                Recurso::Promotores => "backend/promotores",
                Recurso::Articuladores => "backend/articuladores",
                Recurso::PortafolioArco => "backend/portafolio-arco",
                Recurso::ArticuladorCompany => "backend/articulador-empresas",
                Recurso::ArticuladorConvocatoria => "backend/articulador-convocatorias",
            },
        }
    }
}

pub const AUTH_LOGIN: &str = "auth/login";
pub const AUTH_REGISTER: &str = "auth/register";
pub const AUTH_REFRESH: &str = "auth/refresh";
pub const AUTH_ME: &str = "auth/me";

/// Une el origen del backend con una ruta relativa sin duplicar barras.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
