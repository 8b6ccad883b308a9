use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use photo_album::album::PhotoAlbum;
use photo_album::api::HttpPhotoApi;
use photo_album::config::AlbumConfig;
use photo_album::web_pages;

const JPEG_BYTES: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

async fn album_server(api: &MockServer) -> TestServer {
    let config = AlbumConfig::new(Url::parse(&api.uri()).unwrap(), "test-key");
    let client = HttpPhotoApi::new(&config).unwrap();
    let album = Arc::new(PhotoAlbum::new(Arc::new(client), &config));
    TestServer::new(web_pages::router(album, Path::new("static"))).unwrap()
}

fn search_body(keys: &[&str]) -> Value {
    let items: Vec<Value> = keys.iter().map(|key| json!({ "key": key })).collect();
    json!({ "statusCode": 200, "body": serde_json::to_string(&items).unwrap() })
}

#[tokio::test]
async fn search_renders_images_from_the_bucket() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "trees"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["a/b/Tree3.jpeg"])))
        .expect(1)
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let response = server.get("/search").add_query_param("q", "trees").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"src="https://photos-bucket-1.s3.amazonaws.com/Tree3.jpeg""#));
    assert!(html.contains("1 result(s) for &quot;trees&quot;"));

    let gallery: Value = server.get("/api/gallery").await.json();
    assert_eq!(gallery["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(gallery["nodes"][0]["kind"], "image");
}

#[tokio::test]
async fn failed_search_keeps_the_gallery_and_says_so() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&["cat.png"])))
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "dogs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    server.get("/search").add_query_param("q", "cats").await.assert_status_ok();
    let response = server.get("/search").add_query_param("q", "dogs").await;
    let html = response.text();
    assert!(html.contains("Search failed"));
    assert!(html.contains("cat.png"));
}

#[tokio::test]
async fn empty_results_show_the_placeholder() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "body": "[]" })))
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let html = server.get("/search").add_query_param("q", "").await.text();
    assert!(html.contains("No image to display"));
    assert!(!html.contains("<img"));
}

#[tokio::test]
async fn upload_sends_the_photo_and_clears_labels() {
    let api = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/upload/photos-bucket-1/Beach.jpg"))
        .and(header("content-type", "image/jpeg"))
        .and(header("x-amz-meta-customLabels", "sea,sand"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let form = MultipartForm::new()
        .add_text("customLabels", "sea,sand")
        .add_part(
            "file",
            Part::bytes(JPEG_BYTES.to_vec())
                .file_name("Beach.JPG")
                .mime_type("image/jpeg"),
        );
    let response = server.post("/upload").multipart(form).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Photo Uploaded Successfully"));
    assert!(!html.contains(r#"value="sea,sand""#));
}

#[tokio::test]
async fn upload_rejects_unsupported_files_without_calling_the_api() {
    let api = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"GIF89a".to_vec())
            .file_name("anim.gif")
            .mime_type("image/gif"),
    );
    let response = server.post("/upload").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Please select a valid image file (JPG, JPEG, or PNG)."));
}

#[tokio::test]
async fn upload_failure_surfaces_the_error() {
    let api = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let form = MultipartForm::new()
        .add_text("customLabels", "keep me")
        .add_part(
            "file",
            Part::bytes(JPEG_BYTES.to_vec())
                .file_name("photo.jpeg")
                .mime_type("image/jpeg"),
        );
    let response = server.post("/upload").multipart(form).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let html = response.text();
    assert!(html.contains("Photo Upload Failed: photo API returned 403 Forbidden: Forbidden"));
    assert!(html.contains(r#"value="keep me""#));
}

#[tokio::test]
async fn toggling_custom_labels_flips_visibility() {
    let api = MockServer::start().await;
    let server = album_server(&api).await;

    assert!(server.get("/").await.text().contains("display: none"));

    server.post("/labels/toggle").await.assert_status(StatusCode::SEE_OTHER);
    assert!(server.get("/").await.text().contains("display: block"));

    server.post("/labels/toggle").await.assert_status(StatusCode::SEE_OTHER);
    assert!(server.get("/").await.text().contains("display: none"));
}

#[tokio::test]
async fn notices_belong_to_the_upload_response_only() {
    let api = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&api)
        .await;
    let server = album_server(&api).await;

    let form = MultipartForm::new().add_part("file", Part::bytes(b"x".to_vec()).file_name("a.txt"));
    server.post("/upload").multipart(form).await.assert_status(StatusCode::BAD_REQUEST);
    assert!(!server.get("/").await.text().contains("role=\"alert\""));

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(JPEG_BYTES.to_vec())
            .file_name("Beach.jpg")
            .mime_type("image/jpeg"),
    );
    let uploaded = server.post("/upload").multipart(form).await;
    assert!(uploaded.text().contains("Photo Uploaded Successfully"));
    let html = server.get("/").await.text();
    assert!(!html.contains("role=\"alert\""));
    assert!(!html.contains("Photo Uploaded Successfully"));
}
