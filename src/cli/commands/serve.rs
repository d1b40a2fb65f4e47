use anyhow::Context;

use crate::app::{build_router, AppState};
use crate::auth::TokenService;
use crate::config::config;
use crate::database::open_store;

pub async fn handle() -> anyhow::Result<()> {
    let config = config();
    config.validate()?;
    tracing::info!("Starting Profiles API in {:?} mode", config.environment);

    let store = open_store(&config.database).await?;
    tracing::info!("Using {} store", store.backend_name());

    let tokens = TokenService::from_config(&config.security);
    tracing::debug!("Tokens expire after {} hours", tokens.expiry_hours());

    let state = AppState::new(store, tokens);
    let app = build_router(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Profiles API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")
}
