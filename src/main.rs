// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use quiz_server::backend::memory::{MemoryBackend, SeedData};
use quiz_server::config::Config;
use quiz_server::routes;
use quiz_server::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store = Arc::new(MemoryBackend::new());

    // Seed questions and whitelist
    if let Some(path) = &config.seed_file {
        match load_seed(path).await {
            Ok(seed) => store.seed(seed).await,
            Err(e) => tracing::error!("Failed to load seed file {}: {:?}", path, e),
        }
    }

    if config.admin_secret.is_none() {
        tracing::warn!("ADMIN_SECRET is not set; admin login is disabled");
    }

    tracing::info!(
        duration = config.quiz_duration_secs,
        questions = config.question_count,
        "Quiz settings loaded"
    );

    let port = config.port;
    let state = AppState::new(config, store)?;

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_seed(path: &str) -> Result<SeedData, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let seed = serde_json::from_str(&raw)?;
    Ok(seed)
}
