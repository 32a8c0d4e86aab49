use anyhow::Context;
use fobrelay::{app, config::AppConfig, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init(&config.logging);

    let processor = app::build_processor(&config);
    tokio::spawn(processor.limiter().clone().run_cleanup());

    let router = app::build_router(&config, processor)
        .with_context(|| format!("invalid allowed origin {:?}", config.server.allowed_origin))?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
