//! End-to-end tests driving the router against mocked upstreams

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;
use vidrelay_server::{AppState, Config, build_app};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app() -> Router {
    app_with(Config::default())
}

fn app_with(config: Config) -> Router {
    build_app(AppState::from_config(&config).expect("state should build"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "relay.test")
        .header("x-forwarded-proto", "http")
        .body(Body::empty())
        .unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn enc(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

async fn page_server(html: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
        .mount(&server)
        .await;
    server
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_missing_url_is_bad_request() {
    let response = app().oneshot(get("/api/resolve")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Missing ?url=");
}

#[tokio::test]
async fn resolve_invalid_url_is_bad_request() {
    let response = app()
        .oneshot(get("/api/resolve?url=not%20a%20url"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"], "Invalid URL");
}

#[tokio::test]
async fn resolve_video_tag_page() {
    let media = "https://cdn.example/v.mp4";
    let server = page_server(&format!(r#"<html><video src="{}"></video></html>"#, media)).await;
    let page = format!("{}/watch", server.uri());

    let response = app()
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["type"], "mp4");
    assert_eq!(body["pageUrl"], page.as_str());
    assert_eq!(body["rawUrl"], media);
    assert_eq!(body["found"]["mp4"], serde_json::json!([media]));
    assert_eq!(body["found"]["m3u8"], serde_json::json!([]));

    let relay_url = body["relayUrl"].as_str().unwrap();
    assert!(relay_url.starts_with("http://relay.test/api/relay?"));
    assert!(relay_url.contains("url=https%3A%2F%2Fcdn.example%2Fv.mp4"));
    assert!(relay_url.contains(&format!("referer={}", enc(&page))));
}

#[tokio::test]
async fn resolve_failed_probe_still_succeeds() {
    // The probe target refuses connections outright
    let server = page_server(r#"<script>player({"file": "http://127.0.0.1:1/live.m3u8"})</script>"#).await;
    let page = format!("{}/watch", server.uri());

    let response = app()
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["type"], "m3u8");
    assert!(body["filename"].is_null());
    assert!(body["sizeBytes"].is_null());
    assert!(!body["relayUrl"].as_str().unwrap().contains("filename="));
}

#[tokio::test]
async fn resolve_probe_metadata_feeds_relay_link() {
    let server = MockServer::start().await;
    let media = format!("{}/files/abc.mp4", server.uri());
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"<source src="{}" type="video/mp4">"#, media)),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/files/abc.mp4"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"My Trip.mp4\""),
        )
        .mount(&server)
        .await;

    let page = format!("{}/watch", server.uri());
    let response = app()
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();
    let body = json(response).await;

    assert_eq!(body["filename"], "My Trip.mp4");
    assert!(body["relayUrl"].as_str().unwrap().ends_with("&filename=My%20Trip.mp4"));
}

#[tokio::test]
async fn resolve_page_without_media_is_not_found() {
    let server = page_server("<html><body><p>Nothing to see</p></body></html>").await;
    let page = format!("{}/watch", server.uri());

    let response = app()
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json(response).await;
    assert_eq!(body["ok"], false);
    assert!(body.get("found").is_none());
}

#[tokio::test]
async fn resolve_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let page = format!("{}/watch", server.uri());

    let response = app()
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json(response).await["error"], "Upstream fetch failed: 500");
}

#[tokio::test]
async fn resolve_post_json_body() {
    let server = page_server(r#"<video src="https://cdn.example/post.mp4"></video>"#).await;
    let page = format!("{}/watch", server.uri());

    let request = Request::builder()
        .method("POST")
        .uri("/api/resolve")
        .header(header::HOST, "relay.test")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "url": page }).to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["rawUrl"], "https://cdn.example/post.mp4");
    assert!(body["relayUrl"].as_str().unwrap().starts_with("https://relay.test/"));
}

#[tokio::test]
async fn resolve_uses_public_base_url() {
    let server = page_server(r#"<video src="https://cdn.example/v.mp4"></video>"#).await;
    let page = format!("{}/watch", server.uri());

    let config = Config {
        public_base_url: Some("https://dl.example.org".to_string()),
        ..Config::default()
    };
    let response = app_with(config)
        .oneshot(get(&format!("/api/resolve?url={}", enc(&page))))
        .await
        .unwrap();

    let body = json(response).await;
    assert!(body["relayUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://dl.example.org/api/relay?url="));
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_streams_file_as_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos/clip123.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"0123456789".to_vec(), "video/mp4"))
        .mount(&server)
        .await;

    let target = format!("{}/videos/clip123.mp4?sig=abc", server.uri());
    let response = app()
        .oneshot(get(&format!("/api/relay?url={}", enc(&target))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_LENGTH], "10");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"clip123.mp4\""
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.as_ref(), b"0123456789");
}

#[tokio::test]
async fn relay_filename_override() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let target = format!("{}/v.mp4", server.uri());
    let response = app()
        .oneshot(get(&format!(
            "/api/relay?url={}&filename={}",
            enc(&target),
            enc("Holiday 2024.mp4")
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Holiday 2024.mp4\""
    );
}

#[tokio::test]
async fn relay_upstream_error_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = format!("{}/gone.mp4", server.uri());
    let response = app()
        .oneshot(get(&format!("/api/relay?url={}", enc(&target))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Upstream fetch failed: 404");
}

#[tokio::test]
async fn relay_missing_url_is_bad_request() {
    let response = app().oneshot(get("/api/relay")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"], "Missing ?url=");
}

#[tokio::test]
async fn relay_malformed_url_is_bad_request() {
    let response = app()
        .oneshot(get("/api/relay?url=%3A%2F%2Fbroken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"], "Invalid URL");
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "ok");
}
