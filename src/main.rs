// --- Ecosistema de innovación - Archivo principal ---

use ecosistema::config::Config;
use ecosistema::run_server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("configuración inválida: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    println!("=== Ecosistema de Innovación (API) ===");
    println!("Iniciando servidor en http://{}", config.bind_addr);
    run_server(config).await
}
