use actix_web::{middleware, web, App, HttpServer};
use studentdb::{JsonFileStore, RecordService};
use std::path::PathBuf;
use std::sync::Mutex;

mod config;
mod handlers;

use config::ServerConfig;

/// Shared application state
pub struct AppState {
    /// One load/act/save cycle at a time within this process
    pub service: Mutex<RecordService>,
    pub data_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    log::info!("Starting studentdb server");

    let config = ServerConfig::from_env();

    log::info!("Using student document: {}", config.data_file.display());
    let store = JsonFileStore::new(&config.data_file);
    store
        .create_if_missing()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let state = web::Data::new(AppState {
        service: Mutex::new(RecordService::new(store)),
        data_file: config.data_file.clone(),
    });

    log::info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(handlers::json_config())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
