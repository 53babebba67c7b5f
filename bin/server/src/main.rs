mod config;
mod constants;
mod handlers;
mod state;

use actix_web::{middleware, web, App, HttpServer};
use config::ServerConfig;
use state::AppState;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing with env filter
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,actix_server::worker=warn,actix_server::accept=warn")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting photo push server (PID: {})", std::process::id());

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let state = AppState::from_config(&config).map_err(|e| {
        error!("Failed to initialize server state: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("{:#}", e))
    })?;

    // Fail at startup rather than on the first upload
    let keys = state.keys.get().map_err(|e| {
        error!("Failed to load VAPID keys: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    info!(
        public_key = keys.public_key_base64url(),
        "VAPID keys loaded"
    );
    info!(
        data_dir = ?config.data_dir,
        public_url = %config.public_url,
        "Storing photos on the filesystem"
    );

    let state = web::Data::new(state);
    let max_upload_bytes = config.max_upload_bytes;
    let bind_address = config.bind_address();

    info!("Starting server on http://{}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(handlers::json_config(max_upload_bytes))
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    info!("Server bound successfully to http://{}", bind_address);

    server.run().await
}
