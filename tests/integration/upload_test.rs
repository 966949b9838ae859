// Upload endpoint tests over a real socket

use image::ImageFormat;
use reqwest::StatusCode;
use serde_json::Value;

use super::test_harness::{self, exists, image_bytes, upload_form};

#[tokio::test]
async fn test_png_upload_is_resized_and_stored() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    let form = upload_form("shot.png", image_bytes(400, 200, ImageFormat::Png)).text("width", "200");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["format"], "png");
    assert_eq!(body["width"], 200);
    assert_eq!(body["height"], 100);

    let stored = server.stored("shot.png").expect("file written");
    assert_eq!(body["bytes"], stored.len() as u64);
    assert!(exists(&server.upload_dir().join("shot.png")));
    let img = image::load_from_memory(&stored).unwrap();
    assert_eq!((img.width(), img.height()), (200, 100));
}

#[tokio::test]
async fn test_default_width_applies_without_width_field() {
    let server = test_harness::start_with(|_, pipeline| pipeline.target_width = 64).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/upload"))
        .multipart(upload_form("photo.jpg", image_bytes(128, 96, ImageFormat::Jpeg)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["format"], "jpeg");
    assert_eq!(body["width"], 64);
    assert_eq!(body["height"], 48);
}

#[tokio::test]
async fn test_directory_components_in_file_name_are_dropped() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    let form = upload_form("../../escape.png", image_bytes(40, 20, ImageFormat::Png)).text("width", "20");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.stored("escape.png").is_some());
    assert!(!server.dir.path().join("escape.png").exists());
}

#[tokio::test]
async fn test_non_image_upload_is_rejected_at_decode() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/upload"))
        .multipart(upload_form("notes.png", b"just some text".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["stage"], "decode");
    assert!(body["error"].as_str().unwrap().contains("decode"));
    assert_eq!(server.stored_count(), 0);
    assert_eq!(server.state.metrics.stage_failures(upmark::pipeline::Stage::Decode), 1);
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("width", "100");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["stage"].is_null());
}

#[tokio::test]
async fn test_invalid_width_is_bad_request() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    let form = upload_form("a.png", image_bytes(10, 10, ImageFormat::Png)).text("width", "wide");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.stored_count(), 0);
}

#[tokio::test]
async fn test_width_above_maximum_fails_at_resize() {
    let server = test_harness::start_with(|_, pipeline| pipeline.max_target_width = 100).await;
    let client = reqwest::Client::new();

    let form = upload_form("a.png", image_bytes(10, 10, ImageFormat::Png)).text("width", "101");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["stage"], "resize");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = test_harness::start_with(|server, _| server.max_upload_size = 1024).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/upload"))
        .multipart(upload_form("big.bmp", image_bytes(100, 100, ImageFormat::Bmp)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.stored_count(), 0);
}

#[tokio::test]
async fn test_body_over_transport_limit_reports_configured_maximum() {
    let server = test_harness::start_with(|server, _| server.max_upload_size = 1024).await;
    let client = reqwest::Client::new();

    // 200x200 BMP is ~120 KB, past the body limit layer as well
    let response = client
        .post(server.url("/upload"))
        .multipart(upload_form("huge.bmp", image_bytes(200, 200, ImageFormat::Bmp)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("1024"), "{}", message);
    assert!(!message.contains("1025"), "{}", message);
    assert!(body["stage"].is_null());
    assert_eq!(server.stored_count(), 0);
}

#[tokio::test]
async fn test_expired_deadline_cancels_upload() {
    let server = test_harness::start_with(|server, _| server.request_timeout = 0).await;
    let client = reqwest::Client::new();

    let form = upload_form("slow.png", image_bytes(1600, 1200, ImageFormat::Png)).text("width", "1000");
    let response = client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(server.stored_count(), 0);
    assert_eq!(server.state.metrics.uploads_cancelled(), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_harness::start().await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_endpoint_counts_uploads() {
    let server = test_harness::start().await;
    let client = reqwest::Client::new();

    client
        .post(server.url("/upload"))
        .multipart(upload_form("m.png", image_bytes(40, 40, ImageFormat::Png)).text("width", "20"))
        .send()
        .await
        .unwrap();

    let response = reqwest::get(server.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = response.text().await.unwrap();
    assert!(text.contains("upmark_uploads_total 1\n"));
    assert!(text.contains("upmark_uploads_succeeded_total 1\n"));
    assert!(text.contains("upmark_responses_total{status=\"200\"} 1\n"));
}

#[tokio::test]
async fn test_index_page_served() {
    let server = test_harness::start().await;

    let response = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("<form>"));
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let server = test_harness::start().await;

    let response = reqwest::get(server.url("/upload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = reqwest::Client::new()
        .post(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
