// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::users::users_handler;
use crate::directory::{DirectoryClient, TopUsersQuery};
use crate::processing::UserProcessor;

/// Shared handler state
///
/// Everything in here is built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn DirectoryClient>,
    pub processor: Arc<UserProcessor>,
    /// Page of users requested from the directory on every call
    pub users_query: TopUsersQuery,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        processor: Arc<UserProcessor>,
        users_query: TopUsersQuery,
    ) -> Self {
        Self {
            directory,
            processor,
            users_query,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub detector: String,
}

/// Build the router
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/users", post(users_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl+C
pub async fn start_server(state: Arc<AppState>, listen_addr: &str) -> Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("⏹️  Shutdown signal received");
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        detector: state.processor.detector_name().to_string(),
    })
}
