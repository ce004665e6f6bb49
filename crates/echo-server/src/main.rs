mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use echo_api::auth::{AppState, AppStateInner};
use echo_api::pagination::PageLimits;
use echo_api::router::build_router;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echo=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = echo_db::Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        pages: PageLimits {
            default_size: config.default_page_size,
            max_size: config.max_page_size,
        },
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Echo server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
