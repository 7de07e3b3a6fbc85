// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::ocr::ocr_handler;
use crate::config::ServiceConfig;
use crate::pipeline::OcrPipeline;
use crate::vision::{TextRecognizer, MAX_UPLOAD_BYTES};

/// Allowance for multipart boundaries and part headers on top of the file
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared router state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: OcrPipeline,
    pub service_name: String,
}

impl AppState {
    pub fn new(pipeline: OcrPipeline, service_name: impl Into<String>) -> Self {
        Self {
            pipeline,
            service_name: service_name.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let pipeline = OcrPipeline::new(recognizer).with_timeout(config.recognition_timeout());
        Self::new(pipeline, config.service_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ocr", post(ocr_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
        // Development setting: any origin, method and header
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    config: &ServiceConfig,
    recognizer: Arc<dyn TextRecognizer>,
) -> Result<()> {
    let state = Arc::new(AppState::from_config(config, recognizer));
    let app = create_app(state.clone());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!(
        "{} listening on {} ({} recognizer)",
        config.service_name,
        listener.local_addr()?,
        state.pipeline.recognizer_name()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// GET /health - always healthy while the process serves requests
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
    })
}
