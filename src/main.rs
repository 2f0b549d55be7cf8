mod config;
mod db;
mod error;
mod handlers;
mod models;
mod ranking;
mod utils;
mod voting;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, header::CONTENT_TYPE};
use config::Config;
use db::{ContestStore, Database, MemoryStore};
use handlers::AppState;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // Prefer the configured database; fall back to the seeded in-memory
    // store so the app still serves demo data without one.
    let store: Arc<dyn ContestStore> = match &config.database_url {
        Some(url) => match Database::new(url).await {
            Ok(db) => {
                info!("Connected to database at {}", url);
                Arc::new(db)
            }
            Err(e) => {
                warn!("Database connection failed, continuing with demo data: {}", e);
                Arc::new(MemoryStore::with_demo_data())
            }
        },
        None => {
            warn!("DATABASE_URL not set, using in-memory demo store");
            Arc::new(MemoryStore::with_demo_data())
        }
    };

    let state = AppState {
        store,
        ping_message: config.ping_message.clone(),
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = handlers::router(state).layer(cors);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            return;
        }
    };
    info!("Server running on {}", address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
