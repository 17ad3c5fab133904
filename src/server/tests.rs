use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};

use super::{configure, json_config};
use crate::testing::{Harness, StubFetcher, StubGenerator, StubStore, ORIGINAL_URL, TEMP_URL};

const BOUNDARY: &str = "relay-test-boundary";

fn multipart_body(text_fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in text_fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"source.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(text_fields: &[(&str, &str)], image: Option<&[u8]>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/remix")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(text_fields, image))
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.pipeline()))
                .app_data(json_config())
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let harness = Harness::happy();
    let app = app!(harness);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn test_generate_end_to_end() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"prompt": "a red fox", "aspect_ratio": "1:1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "original_url": ORIGINAL_URL,
            "cloudinary_url": "https://cdn/x.png",
            "public_id": "ideogram-images/x"
        })
    );
}

#[actix_web::test]
async fn test_generate_without_prompt_is_400() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"aspect_ratio": "1:1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Prompt is required"}));
    assert!(harness.untouched());
}

#[actix_web::test]
async fn test_reframe_empty_body_is_400() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/reframe")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Image URL is required"}));
    assert!(harness.untouched());
}

#[actix_web::test]
async fn test_malformed_json_is_400_with_error_body() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"prompt\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_reframe_without_image_is_500() {
    let harness = Harness::new(
        StubGenerator::returning(&[]),
        StubFetcher::returning(vec![]),
        StubStore::default(),
    );
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/reframe")
        .set_json(json!({"image_url": "https://src/a.png"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.store.calls(), 0);
}

#[actix_web::test]
async fn test_transcode_failure_is_500() {
    let harness = Harness::new(
        StubGenerator::returning(&[ORIGINAL_URL]),
        StubFetcher::returning(b"%PDF-1.4".to_vec()),
        StubStore::default(),
    );
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"prompt": "fox"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.store.calls(), 0);
}

#[actix_web::test]
async fn test_remix_upstream_error_surfaces_verbatim() {
    let harness = Harness::new(
        StubGenerator::failing("Remix model unavailable"),
        StubFetcher::returning(vec![]),
        StubStore::default(),
    );
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/remix")
        .set_json(json!({"image_url": "https://src/a.png", "prompt": "neon"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Remix model unavailable"}));
}

#[actix_web::test]
async fn test_remix_without_source_is_400() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = multipart_request(&[("prompt", "neon")], None).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Image file or image URL is required"}));
    assert!(harness.untouched());
}

#[actix_web::test]
async fn test_remix_without_prompt_is_400() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/remix")
        .set_json(json!({"image_url": "https://src/a.png"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Prompt is required"}));
    assert!(harness.untouched());
}

#[actix_web::test]
async fn test_remix_empty_json_body_is_400() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = test::TestRequest::post().uri("/api/remix").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(harness.untouched());
}

#[actix_web::test]
async fn test_remix_multipart_file_takes_precedence() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = multipart_request(
        &[
            ("image_url", "https://src/ignored.png"),
            ("prompt", "in neon"),
            ("aspect_ratio", "4:3"),
        ],
        Some(&[0x89, b'P', b'N', b'G'][..]),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["original_url"], ORIGINAL_URL);
    assert_eq!(body["public_id"], "ideogram-remixed/x");

    assert_eq!(
        harness.generator.last_image_url.lock().unwrap().as_deref(),
        Some(TEMP_URL)
    );
    assert_eq!(harness.store.folders(), vec!["temp", "ideogram-remixed"]);
    assert_eq!(
        harness.store.uploads.lock().unwrap()[0].1,
        vec![0x89, b'P', b'N', b'G']
    );
}

#[actix_web::test]
async fn test_remix_multipart_with_url_only() {
    let harness = Harness::happy();
    let app = app!(harness);

    let req = multipart_request(
        &[("image_url", "https://src/a.png"), ("prompt", "in neon")],
        None,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(harness.store.folders(), vec!["ideogram-remixed"]);
}
