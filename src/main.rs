mod audit;
mod config;
mod db;
mod ids;
mod rooms;
mod routes;
mod state;
mod validate;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "slateboard_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "slateboard_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("Slateboard server v{} starting", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite audit database
    let db = db::init_db(&config.data_dir)?;

    // Spawn the fire-and-forget audit writer
    let audit = audit::AuditSink::spawn(db.clone());

    let app_state = state::AppState {
        db,
        rooms: Arc::new(rooms::registry::RoomRegistry::new()),
        audit,
    };

    let app = routes::build_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
