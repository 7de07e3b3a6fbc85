// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir OCR Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-zone-temperature-ocr-2026-10-14";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-14";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "autocontrast-median-preprocessing",
    "paddleocr-cpu",
    "lazy-model-init",
    "zone-temperature-extraction",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir OCR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
