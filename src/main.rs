use std::sync::Arc;

use log::info;

use config::Config;
use model::AppState;

mod auth;
mod config;
mod logger;
mod model;
mod routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logger::init(config.log_level)?;

    info!("Starting footprint server at {}", config.addr);
    info!("Using database {}", config.database);

    let state = Arc::new(AppState::build(&config)?);
    let app = routes::router(state);

    axum::Server::bind(&config.addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
