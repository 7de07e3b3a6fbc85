// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod extraction;
pub mod pipeline;
pub mod version;
pub mod vision;

pub use config::{InitPolicy, ServiceConfig};
pub use pipeline::{build_recognizer, OcrPipeline};
