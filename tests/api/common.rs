// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for router tests: a scripted recognizer and multipart bodies
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fabstir_ocr_node::api::http_server::{create_app, AppState};
use fabstir_ocr_node::pipeline::OcrPipeline;
use fabstir_ocr_node::vision::{RecognitionError, TextFragment, TextRecognizer};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

pub const BOUNDARY: &str = "ocr-test-boundary";
pub const SERVICE_NAME: &str = "Test OCR Service";

enum Outcome {
    Fragments(Vec<String>),
    Fail(String),
}

/// Recognizer returning scripted output and recording every call
pub struct FakeRecognizer {
    outcome: Outcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_dimensions: Mutex<Option<(u32, u32)>>,
}

impl FakeRecognizer {
    pub fn returning(fragments: &[&str]) -> Self {
        Self::with_outcome(Outcome::Fragments(
            fragments.iter().map(|f| f.to_string()).collect(),
        ))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Outcome::Fail(message.to_string()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            last_dimensions: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_dimensions(&self) -> Option<(u32, u32)> {
        *self.last_dimensions.lock().unwrap()
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    fn name(&self) -> &str {
        "fake"
    }

    async fn recognize(
        &self,
        image: image::GrayImage,
    ) -> Result<Vec<TextFragment>, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_dimensions.lock().unwrap() = Some(image.dimensions());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            Outcome::Fragments(fragments) => {
                Ok(fragments.iter().map(|f| TextFragment::text(f.as_str())).collect())
            }
            Outcome::Fail(message) => Err(RecognitionError::InferenceFailed(message.clone())),
        }
    }
}

/// Router backed by the given recognizer
pub fn app_with(recognizer: Arc<FakeRecognizer>, timeout: Duration) -> Router {
    let pipeline = OcrPipeline::new(recognizer).with_timeout(timeout);
    create_app(Arc::new(AppState::new(pipeline, SERVICE_NAME)))
}

/// Small RGB PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 20, 20])
        }
    }));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// One multipart part
pub fn part(name: &str, file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", name);
    if let Some(file_name) = file_name {
        disposition.push_str(&format!("; filename=\"{}\"", file_name));
    }

    let mut out = format!("--{}\r\n{}\r\n", BOUNDARY, disposition).into_bytes();
    if let Some(content_type) = content_type {
        out.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

/// Join parts and close the body
pub fn multipart_body(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let mut body: Vec<u8> = parts.into_iter().flatten().collect();
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Multipart body with a single `file` part
pub fn file_upload(content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    multipart_body(vec![part("file", Some("panel.png"), content_type, data)])
}

/// POST a multipart body to /ocr, returning status and JSON body
pub async fn post_ocr(app: Router, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
