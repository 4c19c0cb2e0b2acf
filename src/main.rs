use shared_pad::config::Config;
use shared_pad::db::padstore::FilePadStore;
use shared_pad::routes::create_app_routes;
use shared_pad::ws::padhub::PadHub;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;
use std::sync::Arc;

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Configuration comes first so its log level can seed the filter
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .init();

    info!("Starting server...");
    match &loaded {
        Ok(_) => info!("✅ Configuration loaded successfully"),
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            warn!("Using default configuration");
        }
    }

    // Prepare the pad store
    let store = FilePadStore::new(&config.data_dir);
    match store.ensure_dir().await {
        Ok(()) => info!("Pads are stored in {}", store.dir().display()),
        Err(e) => {
            error!("Failed to prepare pad directory: {}", e);
            warn!("Pads will start empty until the directory becomes writable");
        }
    }

    // The hub owns the room table and the write-behind saver for the process lifetime
    let hub = Arc::new(PadHub::new(Arc::new(store), config.save_debounce()));
    let app_routes = create_app_routes(hub.clone(), &config.cors_origin_list());

    // Start the HTTP/WebSocket server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Shared pad listening on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app_routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    // Don't lose edits still waiting for their debounce timer
    let flushed = hub.saver().flush().await;
    info!("Server stopped ({} pad(s) flushed)", flushed);
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
