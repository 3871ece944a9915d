//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;

use crate::handlers;
use crate::live_reload;
use crate::middleware::headers;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // Runtime API
    let api_routes = Router::new()
        .route("/api/log", post(handlers::api::log_message))
        .route(
            "/api/core/convertFileSrc",
            post(handlers::api::convert_file_src),
        )
        .route("/api/core/getArgs", get(handlers::api::get_args));

    // Application documents and files
    let app_routes = Router::new()
        .route("/", get(handlers::document::redirect_to_app))
        .route("/app", get(handlers::document::get_app_root))
        .route("/app/", get(handlers::document::get_app_root))
        .route("/app/{*path}", get(handlers::document::get_app_path))
        .route("/file/{*path}", get(handlers::files::get_local_file))
        .route("/embed/{*path}", get(handlers::embed::get_embedded))
        .route("/favicon.ico", get(handlers::files::get_favicon));

    let mut router = Router::new().merge(api_routes).merge(app_routes);

    // WebSocket for live reload
    if let Some(manager) = &state.live_reload {
        let registry = Arc::clone(manager.registry());
        router = router.route("/ws", get(live_reload::ws_handler).with_state(registry));
    }

    router = router.layer(
        ServiceBuilder::new()
            .layer(headers::content_type_options_layer())
            .layer(headers::cache_control_layer()),
    );

    if state.log_requests {
        router = router.layer(headers::request_log_layer());
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::live_reload::LiveReloadManager;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};
    use tower::ServiceExt; // for oneshot()

    const PNG: [u8; 10] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

    fn state(root: &Path) -> AppState {
        AppState {
            root_dir: root.to_path_buf(),
            entry: None,
            live_reload: None,
            app_args: Vec::new(),
            log_requests: false,
        }
    }

    fn app_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            r#"<html><head><title>App</title></head><body><img src="logo.png"></body></html>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("logo.png"), PNG).unwrap();
        std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
        dir
    }

    async fn send(state: AppState, request: Request<Body>) -> Response {
        create_router(Arc::new(state)).oneshot(request).await.unwrap()
    }

    async fn get(state: AppState, uri: &str) -> Response {
        send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(state: AppState, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        send(state, request).await
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_text(response: Response) -> String {
        String::from_utf8(body_bytes(response).await).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn script_srcs(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("head > script").unwrap();
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("src").map(str::to_owned))
            .collect()
    }

    fn img_srcs(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("img").unwrap();
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("src").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn test_root_redirects_to_app() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/app/");
    }

    #[tokio::test]
    async fn test_root_redirects_to_entry_document() {
        let dir = app_dir();
        let mut state = state(dir.path());
        state.entry = Some("main page.html".to_owned());

        let response = get(state, "/").await;

        assert_eq!(location(&response), "/app/main%20page.html");
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let dir = app_dir();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let response = get(state(dir.path()), "/app").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/app/");

        let response = get(state(dir.path()), "/app/sub").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/app/sub/");
    }

    #[tokio::test]
    async fn test_index_is_transformed() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/app/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        let html = body_text(response).await;
        assert_eq!(script_srcs(&html), vec!["/embed/runtime.js"]);
        let expected = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG)
        );
        assert_eq!(img_srcs(&html), vec![expected]);
    }

    #[tokio::test]
    async fn test_html_extension_is_case_insensitive() {
        let dir = app_dir();
        std::fs::write(dir.path().join("Page.HTML"), "<p>hi</p>").unwrap();

        let html = body_text(get(state(dir.path()), "/app/Page.HTML").await).await;

        assert_eq!(script_srcs(&html), vec!["/embed/runtime.js"]);
    }

    #[tokio::test]
    async fn test_nested_document_resolves_images_from_root() {
        let dir = app_dir();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(
            sub.join("index.html"),
            r#"<img src="logo.png"><img src="sub/pic.png"><img src="pic.png">"#,
        )
        .unwrap();
        std::fs::write(sub.join("pic.png"), PNG).unwrap();

        let html = body_text(get(state(dir.path()), "/app/sub/").await).await;

        let srcs = img_srcs(&html);
        let expected = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(PNG)
        );
        assert_eq!(srcs[0], expected);
        assert_eq!(srcs[1], expected);
        // Not under the root, so left as written
        assert_eq!(srcs[2], "pic.png");
    }

    #[tokio::test]
    async fn test_non_html_served_verbatim() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/app/style.css").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(body_text(response).await, "body { margin: 0; }");
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/app/missing.html").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let dir = app_dir();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let response = get(state(dir.path()), "/app/empty/").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parent_traversal_is_not_found() {
        let dir = app_dir();
        let app = dir.path().join("app");
        std::fs::create_dir(&app).unwrap();
        std::fs::write(app.join("index.html"), "<p></p>").unwrap();

        let response = get(state(&app), "/app/%2E%2E/index.html").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_legacy_encoded_document_is_rendered() {
        let dir = app_dir();
        std::fs::write(dir.path().join("latin1.html"), b"<p>caf\xE9</p>").unwrap();

        let response = get(state(dir.path()), "/app/latin1.html").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<p>caf\u{FFFD}</p>"));
        assert_eq!(script_srcs(&html), vec!["/embed/runtime.js"]);
    }

    #[tokio::test]
    async fn test_undecodable_document_is_server_error() {
        let dir = app_dir();
        // UTF-16LE byte order mark followed by an unpaired surrogate
        std::fs::write(dir.path().join("bad.html"), [0xFF, 0xFE, 0x3C, 0x00, 0x00, 0xD8]).unwrap();

        let response = get(state(dir.path()), "/app/bad.html").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_local_file_served_by_absolute_path() {
        let dir = app_dir();
        let file = dir.path().join("my pic.png");
        std::fs::write(&file, PNG).unwrap();
        let uri = format!("/file/{}", file.display()).replace(' ', "%20");

        let response = get(state(dir.path()), &uri).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, PNG);
    }

    #[tokio::test]
    async fn test_missing_local_file_is_not_found() {
        let dir = app_dir();
        let uri = format!("/file/{}/nope.png", dir.path().display());

        let response = get(state(dir.path()), &uri).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_favicon_served_from_root() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        std::fs::write(dir.path().join("favicon.ico"), [0, 0, 1, 0]).unwrap();
        let response = get(state(dir.path()), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_embedded_scripts() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/embed/runtime.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            htapp_assets::mime_for("runtime.js")
        );
        assert!(body_text(response).await.contains("window.htapp"));

        let response = get(state(dir.path()), "/embed/missing.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_log_endpoint() {
        let dir = app_dir();

        let response = post_json(state(dir.path()), "/api/log", r#"{"message":"hello"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_log_endpoint_rejects_malformed_body() {
        let dir = app_dir();

        let response = post_json(state(dir.path()), "/api/log", "{not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_file_src_endpoint() {
        let dir = app_dir();

        let response = post_json(
            state(dir.path()),
            "/api/core/convertFileSrc",
            r#"{"filePath":"file:///tmp/x.png"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#""/file//tmp/x.png""#);
    }

    #[tokio::test]
    async fn test_get_args_endpoint() {
        let dir = app_dir();
        let mut state = state(dir.path());
        state.app_args = vec!["--flag".to_owned(), "value".to_owned()];

        let response = get(state, "/api/core/getArgs").await;

        assert_eq!(body_text(response).await, r#"["--flag","value"]"#);
    }

    #[tokio::test]
    async fn test_response_headers() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/app/").await;

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_release_mode_has_no_websocket() {
        let dir = app_dir();

        let response = get(state(dir.path()), "/ws").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dev_mode_injects_client_and_exposes_websocket() {
        let dir = app_dir();
        let dev_state = || {
            let mut state = state(dir.path());
            state.live_reload = Some(LiveReloadManager::start(
                dir.path(),
                vec!["html".to_owned()],
                Duration::from_millis(100),
            ));
            state
        };

        let html = body_text(get(dev_state(), "/app/").await).await;
        assert_eq!(
            script_srcs(&html),
            vec!["/embed/runtime.js", "/embed/development.js"]
        );

        // Plain GET without upgrade headers is rejected, but the route exists
        let response = get(dev_state(), "/ws").await;
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }
}
