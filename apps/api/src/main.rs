//! Classbook API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod auth;
mod bootstrap;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use classbook_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let app_state = AppState::in_memory(&config)?;
    bootstrap::seed(&app_state, &config).await?;

    let app = build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "classbook-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
