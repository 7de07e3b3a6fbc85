// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_ocr_node::{api::start_server, build_recognizer, version, ServiceConfig};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::parse();

    info!("🚀 Starting {}", version::get_version_string());
    info!("Build {} with features: {}", version::VERSION, version::FEATURES.join(", "));
    info!(
        "Model directory: {} ({:?} init, {}s recognition timeout)",
        config.model_dir.display(),
        config.model_init,
        config.recognition_timeout_secs
    );

    let recognizer = build_recognizer(&config).await?;

    start_server(&config, recognizer).await
}
