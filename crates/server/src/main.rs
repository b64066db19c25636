//! HTTP front door for the article-to-audio pipeline.

use std::sync::Arc;

use audito_core::{AudioCache, FetchConfig};
use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod handlers;

use config::{ServerConfig, synth_from_env};
use handlers::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("audito_server=info,audito_core=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(?config, "starting");

    let state = Arc::new(AppState {
        fetch: FetchConfig::default(),
        synth: synth_from_env(),
        cache: AudioCache::new(),
        config: config.clone(),
    });

    let app = Router::new()
        .route("/", get(handlers::front_door))
        .nest_service("/audio", ServeDir::new(&config.webroot))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
