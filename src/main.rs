use anyhow::{Context, Result};
use murmur::{create_router, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/murmur")?;

    info!("murmur v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!("Worker transport: {}", cfg.worker.nats_url);
    info!(
        "HTTP server binding to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, router).await?;

    Ok(())
}
