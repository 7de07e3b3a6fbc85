// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration from command-line flags and environment

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::vision::OcrModelConfig;

/// Recognition language; only English models are shipped
pub const OCR_LANGUAGE: &str = "en";

/// When the OCR engine is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InitPolicy {
    /// Load at startup; a failure aborts startup
    Eager,
    /// Load on the first OCR request
    #[default]
    Lazy,
}

/// Zone / temperature OCR service
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-ocr-node")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "HTTP OCR service extracting zone / temperature readings", long_about = None)]
pub struct ServiceConfig {
    /// Address to listen on
    #[arg(long, env = "OCR_LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Directory with det_model.onnx, rec_model.onnx and en_dict.txt
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub model_dir: PathBuf,

    /// OCR engine initialization policy
    #[arg(long, env = "OCR_MODEL_INIT", value_enum, default_value_t = InitPolicy::Lazy)]
    pub model_init: InitPolicy,

    /// Upper bound on one recognition call, in seconds
    #[arg(
        long,
        env = "OCR_RECOGNITION_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub recognition_timeout_secs: u64,

    /// Name reported by /health
    #[arg(long, env = "OCR_SERVICE_NAME", default_value = "OCR Zone Temperature Service")]
    pub service_name: String,

    /// ONNX Runtime intra-op threads per model (CPU only)
    #[arg(long, env = "OCR_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            model_dir: PathBuf::from("./models/paddleocr-onnx"),
            model_init: InitPolicy::Lazy,
            recognition_timeout_secs: 30,
            service_name: "OCR Zone Temperature Service".to_string(),
            intra_threads: 4,
        }
    }
}

impl ServiceConfig {
    pub fn recognition_timeout(&self) -> Duration {
        Duration::from_secs(self.recognition_timeout_secs)
    }

    pub fn model_config(&self) -> OcrModelConfig {
        OcrModelConfig {
            model_dir: self.model_dir.clone(),
            language: OCR_LANGUAGE.to_string(),
            intra_threads: self.intra_threads.max(1),
            ..OcrModelConfig::default()
        }
    }
}
