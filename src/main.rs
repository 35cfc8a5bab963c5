use axum::serve;
use comfy_relay::api::routes::create_router;
use comfy_relay::build_service;
use comfy_relay::config::AppConfig;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Keep HTTP client internals quiet unless asked for
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={} engine={} template={}",
        config.server_address(),
        config.engine.base_url,
        config.template.path
    );

    let service = Arc::new(build_service(&config)?);

    // Warm the template cache so a broken file shows up at startup
    if let Err(e) = service.templates().load().await {
        log::warn!("{}", e);
    }

    run_server(create_router().with_state(service), &config).await?;

    Ok(())
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("comfy-relay listening on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
