// Backend REST falso para las pruebas de integración.
// Corre en su propio hilo con su propio System de actix y registra cada
// petición recibida como "MÉTODO /ruta?query".
#![allow(dead_code)]

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};

use ecosistema::config::Config;
use ecosistema::sesion::{MemorySessionStore, SessionStore, CLAVE_REFRESH, CLAVE_TOKEN};
use ecosistema::services::{BackendClient, EndpointSet};

pub type Registro = Arc<Mutex<Vec<String>>>;

pub struct BackendFalso {
    pub base_url: String,
    pub peticiones: Registro,
}

impl BackendFalso {
    pub fn recibidas(&self) -> Vec<String> {
        self.peticiones.lock().unwrap().clone()
    }

    pub fn config(&self) -> Config {
        Config { backend_url: self.base_url.clone(), ..Config::default() }
    }

    /// Cliente con una sesión en memoria que ya tiene `token` y `refresh`.
    pub fn cliente(&self, token: &str, refresh: &str) -> (BackendClient, Arc<MemorySessionStore>) {
        let sesion = Arc::new(MemorySessionStore::new());
        sesion.set(CLAVE_TOKEN, token).unwrap();
        sesion.set(CLAVE_REFRESH, refresh).unwrap();
        let client = BackendClient::new(&self.base_url, reqwest::Client::new(), EndpointSet::Legacy, sesion.clone());
        (client, sesion)
    }
}

fn registrar(reg: &Registro, req: &HttpRequest) {
    let linea = match req.query_string() {
        "" => format!("{} {}", req.method(), req.path()),
        q => format!("{} {}?{}", req.method(), req.path(), q),
    };
    reg.lock().unwrap().push(linea);
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

async fn companies(req: HttpRequest, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    if bearer(&req).as_deref() == Some("viejo") {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": [
            {"id": 1, "nombre": "Acme", "departamento": "Antioquia", "sitioWeb": "https://acme.co"},
            {"id": 2, "nombre": "Sin lugar"}
        ]
    }))
}

async fn company_por_id(req: HttpRequest, id: web::Path<i64>, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    HttpResponse::Ok().json(json!({"id": id.into_inner(), "nombre": "Acme"}))
}

async fn convocatorias(req: HttpRequest, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    HttpResponse::Ok().json(json!([
        {"id": 5, "titulo": "Reto TIC", "departamento": "bogota", "fechaFin": "2000-01-01"}
    ]))
}

async fn crear_convocatoria(req: HttpRequest, body: web::Bytes, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    HttpResponse::Created().content_type("application/json").body(body)
}

async fn articuladores(req: HttpRequest, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    HttpResponse::InternalServerError().json(json!({"message": "fallo interno"}))
}

async fn promotores(req: HttpRequest, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    HttpResponse::Ok().json(json!([]))
}

async fn refresh(req: HttpRequest, body: web::Json<Value>, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    if body.get("refreshToken").and_then(|v| v.as_str()) == Some("r-ok") {
        HttpResponse::Ok().json(json!({"token": "nuevo", "refreshToken": "r2"}))
    } else {
        HttpResponse::Unauthorized().json(json!({"message": "refresh inválido"}))
    }
}

async fn login(req: HttpRequest, body: web::Json<Value>, reg: web::Data<Registro>) -> HttpResponse {
    registrar(&reg, &req);
    let email = body.get("email").and_then(|v| v.as_str()).unwrap_or_default();
    let password = body.get("password").and_then(|v| v.as_str()).unwrap_or_default();
    if email == "ana@correo.co" && password == "secreta" {
        HttpResponse::Ok().json(json!({
            "token": "t1",
            "refreshToken": "r1",
            "user": {"id": 1, "name": "Ana", "email": "ana@correo.co", "role": "admin", "passwordHash": "xyz"}
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({"message": "Credenciales inválidas"}))
    }
}

/// Levanta el backend falso en un puerto libre y devuelve su URL base (`.../api`).
pub fn levantar_backend() -> BackendFalso {
    let peticiones: Registro = Arc::new(Mutex::new(Vec::new()));
    let reg = peticiones.clone();
    let (tx, rx) = mpsc::channel::<SocketAddr>();

    std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async move {
            let srv = HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(reg.clone()))
                    .route("/api/Companies", web::get().to(companies))
                    .route("/api/Companies/{id}", web::get().to(company_por_id))
                    .route("/api/Convocatorias", web::get().to(convocatorias))
                    .route("/api/Convocatorias", web::post().to(crear_convocatoria))
                    .route("/api/Articuladores", web::get().to(articuladores))
                    .route("/api/Promotores", web::get().to(promotores))
                    .route("/api/auth/refresh", web::post().to(refresh))
                    .route("/api/auth/login", web::post().to(login))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .expect("bind backend falso");
            let addr = srv.addrs()[0];
            let server = srv.run();
            tx.send(addr).expect("enviar dirección");
            let _ = server.await;
        });
    });

    let addr = rx.recv().expect("backend falso no arrancó");
    BackendFalso { base_url: format!("http://{}/api", addr), peticiones }
}
