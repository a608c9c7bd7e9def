//! The `serve` subcommand

use tracing::info;

use crate::api::router::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging::{init_logging, LoggingConfig};

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    init_logging(&LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    let state = crate::create_app_state(&config).await?;
    let router = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
