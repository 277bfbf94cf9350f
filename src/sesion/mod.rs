//! Almacenamiento clave/valor de la sesión de autenticación.
//!
//! Equivale al `localStorage` del navegador: tres claves con el JWT, el token
//! de refresco y el registro mínimo del usuario. Hay una implementación en
//! memoria y otra persistente sobre SQLite.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::errores::ServiceError;
use crate::models::UsuarioSesion;

pub const CLAVE_TOKEN: &str = "auth_token";
pub const CLAVE_REFRESH: &str = "auth_refresh_token";
pub const CLAVE_USUARIO: &str = "auth_user";

pub const CLAVES_SESION: [&str; 3] = [CLAVE_TOKEN, CLAVE_REFRESH, CLAVE_USUARIO];

pub trait SessionStore: Send + Sync {
    fn get(&self, clave: &str) -> Result<Option<String>, ServiceError>;
    fn set(&self, clave: &str, valor: &str) -> Result<(), ServiceError>;
    fn remove(&self, clave: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    datos: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sesión en memoria que ya contiene un token (p. ej. el bearer de una petición entrante).
    pub fn con_token(token: &str) -> Self {
        let s = Self::new();
        if let Ok(mut g) = s.datos.lock() {
            g.insert(CLAVE_TOKEN.to_string(), token.to_string());
        }
        s
    }
}

fn envenenado() -> ServiceError {
    ServiceError::Almacenamiento("session store mutex poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn get(&self, clave: &str) -> Result<Option<String>, ServiceError> {
        let g = self.datos.lock().map_err(|_| envenenado())?;
        Ok(g.get(clave).cloned())
    }

    fn set(&self, clave: &str, valor: &str) -> Result<(), ServiceError> {
        let mut g = self.datos.lock().map_err(|_| envenenado())?;
        g.insert(clave.to_string(), valor.to_string());
        Ok(())
    }

    fn remove(&self, clave: &str) -> Result<(), ServiceError> {
        let mut g = self.datos.lock().map_err(|_| envenenado())?;
        g.remove(clave);
        Ok(())
    }
}

/// Sesión persistida en una tabla `sesion(clave, valor)` de SQLite.
///
/// Las llamadas a rusqlite son síncronas y corren en el worker que atiende la
/// petición, con el mutex tomado. Son lecturas y escrituras de una fila por clave;
/// si la tabla crece, pasar estas llamadas a `web::block`.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

fn sqlite_err(e: rusqlite::Error) -> ServiceError {
    ServiceError::Almacenamiento(e.to_string())
}

impl SqliteSessionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| ServiceError::Almacenamiento(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(sqlite_err)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, ServiceError> {
        Self::from_connection(Connection::open_in_memory().map_err(sqlite_err)?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ServiceError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sesion (
                clave TEXT PRIMARY KEY,
                valor TEXT NOT NULL
            )",
            [],
        )
        .map_err(sqlite_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, clave: &str) -> Result<Option<String>, ServiceError> {
        let c = self.conn.lock().map_err(|_| envenenado())?;
        c.query_row("SELECT valor FROM sesion WHERE clave = ?1", params![clave], |row| row.get(0))
            .optional()
            .map_err(sqlite_err)
    }

    fn set(&self, clave: &str, valor: &str) -> Result<(), ServiceError> {
        let c = self.conn.lock().map_err(|_| envenenado())?;
        c.execute(
            "INSERT INTO sesion (clave, valor) VALUES (?1, ?2)
             ON CONFLICT(clave) DO UPDATE SET valor = excluded.valor",
            params![clave, valor],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn remove(&self, clave: &str) -> Result<(), ServiceError> {
        let c = self.conn.lock().map_err(|_| envenenado())?;
        c.execute("DELETE FROM sesion WHERE clave = ?1", params![clave]).map_err(sqlite_err)?;
        Ok(())
    }
}

/// Guarda los tokens y el usuario minimizado tras un login correcto.
pub fn guardar_sesion(store: &dyn SessionStore, token: &str, refresh: Option<&str>, usuario: &UsuarioSesion) -> Result<(), ServiceError> {
    store.set(CLAVE_TOKEN, token)?;
    match refresh {
        Some(r) => store.set(CLAVE_REFRESH, r)?,
        None => store.remove(CLAVE_REFRESH)?,
    }
    store.set(CLAVE_USUARIO, &serde_json::to_string(usuario)?)?;
    Ok(())
}

/// Cierra la sesión: borra las tres claves.
pub fn limpiar_sesion(store: &dyn SessionStore) -> Result<(), ServiceError> {
    for clave in CLAVES_SESION {
        store.remove(clave)?;
    }
    Ok(())
}

/// Usuario guardado; un valor corrupto se trata como ausente.
pub fn leer_usuario(store: &dyn SessionStore) -> Result<Option<UsuarioSesion>, ServiceError> {
    Ok(store.get(CLAVE_USUARIO)?.and_then(|s| serde_json::from_str(&s).ok()))
}
