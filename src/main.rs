use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use clinivault::auth::TokenSigner;
use clinivault::config;
use clinivault::db;
use clinivault::ledger::LedgerClient;
use clinivault::state::AppState;
use clinivault::storage::LocalBlobStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(config::uploads_dir())?;

    // Opening once at startup runs pending migrations; requests open
    // their own connections afterwards.
    let db_path = config::db_path();
    db::open_database(&db_path)?;

    let ledger = match config::ledger_url() {
        Some(url) => {
            tracing::info!(%url, "Using external audit ledger");
            LedgerClient::http(url)
        }
        None => LedgerClient::stub(),
    };

    let state = Arc::new(AppState {
        db_path,
        blobs: LocalBlobStore::new(config::uploads_dir()),
        ledger,
        tokens: TokenSigner::new(config::token_secret()),
    });

    let cors = CorsLayer::new()
        .allow_origin(config::cors_origin().parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let app = clinivault::api::api_router(state).layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
