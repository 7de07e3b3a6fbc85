// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /ocr tests
//!
//! Drives the full router with a scripted recognizer:
//! - Successful extraction and the empty result
//! - Upload validation (missing field, content type, size)
//! - Decode failures
//! - Recognizer failures and timeouts

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fabstir_ocr_node::vision::MAX_UPLOAD_BYTES;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::common::{
    app_with, file_upload, multipart_body, part, png_bytes, post_ocr, send, FakeRecognizer,
};

const TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::test]
async fn test_scenario_returns_paired_records() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[
        "B12", "43,5", "noise###", "L7 89.0C",
    ]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(40, 20))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"results": [
            {"zona": "B12", "valor": "43.5"},
            {"zona": "B7", "valor": "89.0"}
        ]})
    );
    assert_eq!(recognizer.calls(), 1);
}

#[tokio::test]
async fn test_recognizer_sees_preprocessed_image_at_original_size() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, _) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(37, 11))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recognizer.last_dimensions(), Some((37, 11)));
}

#[tokio::test]
async fn test_zero_fragments_returns_empty_results() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer, TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(8, 8))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn test_text_without_matches_returns_empty_results() {
    let recognizer = Arc::new(FakeRecognizer::returning(&["PANEL", "STATUS OK"]));
    let app = app_with(recognizer, TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(8, 8))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_non_image_content_type_rejected_before_recognition() {
    let recognizer = Arc::new(FakeRecognizer::returning(&["B1 20.0"]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("text/plain"), b"B1 20.0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("not an image"));
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["request_id"].is_string());
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_missing_content_type_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(None, &png_bytes(4, 4))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("not an image"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let data = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("too large"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_body_over_transport_limit_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let data = vec![0u8; MAX_UPLOAD_BYTES + 1024 * 1024];
    let (status, _) = post_ocr(app, file_upload(Some("image/png"), &data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_undecodable_image_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), b"definitely not pixels")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "decode_error");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("cannot open image"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_truncated_png_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer, TIMEOUT);

    let png = png_bytes(16, 16);
    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png[..png.len() / 2])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "decode_error");
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let body = multipart_body(vec![part("note", None, None, b"no file here")]);
    let (status, body) = post_ocr(app, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "file is required");
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_non_multipart_request_rejected() {
    let recognizer = Arc::new(FakeRecognizer::returning(&[]));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let request = Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image":"abc"}"#))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("file is required"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn test_first_named_file_accepted_under_other_field() {
    let recognizer = Arc::new(FakeRecognizer::returning(&["BT3 101,2C"]));
    let app = app_with(recognizer, TIMEOUT);

    let body = multipart_body(vec![
        part("note", None, None, b"front panel"),
        part("upload", Some("panel.png"), Some("image/png"), &png_bytes(8, 8)),
    ]);
    let (status, body) = post_ocr(app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"results": [{"zona": "BT3", "valor": "101.2"}]}));
}

#[tokio::test]
async fn test_recognizer_failure_returns_500() {
    let recognizer = Arc::new(FakeRecognizer::failing("session crashed"));
    let app = app_with(recognizer.clone(), TIMEOUT);

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(8, 8))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "recognition_error");
    assert!(body["detail"].as_str().unwrap().contains("session crashed"));
    assert!(body.get("results").is_none());
    assert_eq!(recognizer.calls(), 1);
}

#[tokio::test]
async fn test_recognition_timeout_returns_500() {
    let recognizer =
        Arc::new(FakeRecognizer::returning(&["B1 20.0"]).with_delay(Duration::from_secs(10)));
    let app = app_with(recognizer, Duration::from_secs(1));

    let (status, body) = post_ocr(app, file_upload(Some("image/png"), &png_bytes(8, 8))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_get_ocr_not_allowed() {
    let app = app_with(Arc::new(FakeRecognizer::returning(&[])), TIMEOUT);

    let request = Request::builder()
        .method("GET")
        .uri("/ocr")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
