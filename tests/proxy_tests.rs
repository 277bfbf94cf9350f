mod common;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use ecosistema::config::Config;
use ecosistema::server::{rutas, AppState};

use common::levantar_backend;

#[actix_web::test]
async fn test_proxy_id_pasa_a_segmento() {
    let backend = levantar_backend();
    let state = AppState::from_config(backend.config()).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    let req = test::TestRequest::get()
        .uri("/api/proxy/companies?id=7")
        .insert_header(("Authorization", "Bearer nuevo"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 7);
    assert_eq!(backend.recibidas(), vec!["GET /api/Companies/7"]);
}

#[actix_web::test]
async fn test_proxy_conserva_status_del_backend() {
    let backend = levantar_backend();
    let state = AppState::from_config(backend.config()).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    // el backend rechaza este token: el 401 llega tal cual, sin refresco
    let req = test::TestRequest::get()
        .uri("/api/proxy/companies")
        .insert_header(("Authorization", "Bearer viejo"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.recibidas().len(), 1);
}

#[actix_web::test]
async fn test_proxy_reenvia_cuerpo() {
    let backend = levantar_backend();
    let state = AppState::from_config(backend.config()).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    let nueva = json!({"titulo": "Reto abierto", "presupuesto": 5000});
    let req = test::TestRequest::post().uri("/api/proxy/convocatorias").set_json(&nueva).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, nueva);
}

#[actix_web::test]
async fn test_proxy_backend_inalcanzable() {
    let config = Config { backend_url: "http://127.0.0.1:1/api".to_string(), ..Config::default() };
    let state = AppState::from_config(config).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    let req = test::TestRequest::get().uri("/api/proxy/convocatorias").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
}

#[actix_web::test]
async fn test_proxy_recurso_desconocido() {
    let state = AppState::from_config(Config::default()).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    let req = test::TestRequest::get().uri("/api/proxy/usuarios").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_proxy_id_no_numerico_es_400() {
    let backend = levantar_backend();
    let state = AppState::from_config(backend.config()).unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(rutas)).await;

    let req = test::TestRequest::get().uri("/api/proxy/companies?id=../auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(backend.recibidas().is_empty());
}
