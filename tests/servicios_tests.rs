mod common;

use ecosistema::errores::{ServiceError, MSG_CREDENCIALES};
use ecosistema::models::{Company, Convocatoria, EstadoConvocatoria};
use ecosistema::services::AuthService;
use ecosistema::sesion::{SessionStore, CLAVES_SESION, CLAVE_REFRESH, CLAVE_TOKEN, CLAVE_USUARIO};

use common::levantar_backend;

#[actix_web::test]
async fn test_401_refresca_y_repite() {
    let backend = levantar_backend();
    let (client, sesion) = backend.cliente("viejo", "r-ok");

    let companies: Vec<Company> = client.listar().await.unwrap();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0].nombre, "Acme");
    assert_eq!(sesion.get(CLAVE_TOKEN).unwrap().as_deref(), Some("nuevo"));
    assert_eq!(sesion.get(CLAVE_REFRESH).unwrap().as_deref(), Some("r2"));

    assert_eq!(
        backend.recibidas(),
        vec!["GET /api/Companies", "POST /api/auth/refresh", "GET /api/Companies"]
    );
}

#[actix_web::test]
async fn test_refresh_fallido_cierra_sesion() {
    let backend = levantar_backend();
    let (client, sesion) = backend.cliente("viejo", "r-malo");

    match client.listar::<Company>().await {
        Err(ServiceError::SesionExpirada) => {}
        otro => panic!("se esperaba SesionExpirada: {:?}", otro),
    }
    for clave in CLAVES_SESION {
        assert!(sesion.get(clave).unwrap().is_none(), "{} debió borrarse", clave);
    }
    // no se repite la petición original
    assert_eq!(backend.recibidas().len(), 2);
}

#[actix_web::test]
async fn test_convocatoria_invalida_no_llama_al_backend() {
    let backend = levantar_backend();
    let (client, _) = backend.cliente("nuevo", "r-ok");

    let c = Convocatoria { titulo: "   ".to_string(), ..Default::default() };
    match client.crear(&c).await {
        Err(ServiceError::Validacion(errores)) => assert!(errores.iter().any(|e| e.campo == "titulo")),
        otro => panic!("se esperaba error de validación: {:?}", otro),
    }
    assert!(backend.recibidas().is_empty());
}

#[actix_web::test]
async fn test_crear_convocatoria_valida() {
    let backend = levantar_backend();
    let (client, _) = backend.cliente("nuevo", "r-ok");

    let c = Convocatoria {
        titulo: "Fondo Emprende".to_string(),
        presupuesto: Some(1_000_000),
        enlace: Some("https://fondo.gov.co".to_string()),
        ..Default::default()
    };
    let creada = client.crear(&c).await.unwrap();
    assert_eq!(creada.titulo, "Fondo Emprende");
    assert_eq!(backend.recibidas(), vec!["POST /api/Convocatorias"]);
}

#[actix_web::test]
async fn test_convocatorias_con_estado_calculado() {
    let backend = levantar_backend();
    let (client, _) = backend.cliente("nuevo", "r-ok");

    let lista = client.listar_convocatorias_con_estado().await.unwrap();
    assert_eq!(lista[0].estado, Some(EstadoConvocatoria::Cerrada));
}

#[actix_web::test]
async fn test_obtener_por_id() {
    let backend = levantar_backend();
    let (client, _) = backend.cliente("nuevo", "r-ok");

    let c: Company = client.obtener(7).await.unwrap();
    assert_eq!(c.id, Some(7));
    assert_eq!(backend.recibidas(), vec!["GET /api/Companies/7"]);
}

#[actix_web::test]
async fn test_login_guarda_tres_claves_y_logout_las_borra() {
    let backend = levantar_backend();
    let (client, sesion) = backend.cliente("", "");
    sesion.remove(CLAVE_TOKEN).unwrap();
    sesion.remove(CLAVE_REFRESH).unwrap();
    let auth = AuthService::new(client);

    let usuario = auth.login("ana@correo.co", "secreta").await.unwrap();
    assert_eq!(usuario.nombre, "Ana");
    assert_eq!(usuario.rol.as_deref(), Some("admin"));
    assert!(auth.esta_autenticado());
    assert_eq!(sesion.get(CLAVE_TOKEN).unwrap().as_deref(), Some("t1"));
    assert_eq!(sesion.get(CLAVE_REFRESH).unwrap().as_deref(), Some("r1"));
    let guardado = sesion.get(CLAVE_USUARIO).unwrap().unwrap();
    assert!(!guardado.contains("passwordHash"));
    assert_eq!(auth.usuario_actual().unwrap(), Some(usuario));

    auth.logout().unwrap();
    assert!(!auth.esta_autenticado());
    for clave in CLAVES_SESION {
        assert!(sesion.get(clave).unwrap().is_none());
    }
}

#[actix_web::test]
async fn test_login_con_credenciales_incorrectas() {
    let backend = levantar_backend();
    let (client, _) = backend.cliente("", "");
    let auth = AuthService::new(client);

    let e = auth.login("ana@correo.co", "otra").await.unwrap_err();
    assert_eq!(e.mensaje_usuario(), MSG_CREDENCIALES);
}
