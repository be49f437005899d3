use std::sync::Arc;

use rickshaw::api::DynAPI;
use rickshaw::clock::SystemClock;
use rickshaw::config::Config;
use rickshaw::engine::Engine;
use rickshaw::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), rickshaw::error::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rickshaw=info")),
        )
        .init();

    let config = Config::from_env()?;

    let engine = Arc::new(Engine::new(&config, Arc::new(SystemClock)));

    let shutdown = {
        let engine = engine.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", err);
            }

            tracing::info!("shutting down");
            engine.shutdown().await;
        }
    };

    serve(engine as DynAPI, config.addr, shutdown).await
}
