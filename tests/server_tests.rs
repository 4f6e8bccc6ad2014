// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_relay::config::{AppConfig, ContextLimits};
use ollama_relay::error::ApiError;
use ollama_relay::llm::backend::{BackendHealth, BackendTimeouts, ChatBackend};
use ollama_relay::llm::mock_backend::MockBackend;
use ollama_relay::llm::providers::OllamaBackend;
use ollama_relay::server::{build_app, AppState};

struct TestApp {
    app: Router,
    temp: TempDir,
}

fn test_app(backend: Arc<dyn ChatBackend>, config: AppConfig) -> TestApp {
    let temp = TempDir::new().unwrap();
    let state = AppState::with_timeouts(
        config,
        backend,
        ContextLimits::new(temp.path().join("ollama_context.cfg")),
        temp.path().join("static"),
        BackendTimeouts {
            chat: Duration::from_secs(5),
            summary: Duration::from_secs(1),
            health: Duration::from_millis(500),
            list_models: Duration::from_secs(1),
        },
    );
    TestApp {
        app: build_app(state),
        temp,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_with_unreachable_backend() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let t = test_app(
        Arc::new(OllamaBackend::with_base_url(url.clone())),
        AppConfig::default(),
    );
    let (status, body) = send_json(&t.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ollama_status"], "disconnected");
    assert_eq!(body["ollama_url"], url);
    assert_eq!(body["models_loaded"], 0);
}

#[tokio::test]
async fn test_health_reports_backend_state() {
    let backend = MockBackend::new()
        .with_models(&["llama3", "mistral"])
        .with_health(BackendHealth::Error);
    let t = test_app(Arc::new(backend), AppConfig::default());

    send_json(&t.app, post_json("/refresh-models", json!({}))).await;
    let (status, body) = send_json(&t.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ollama_status"], "error");
    assert_eq!(body["models_loaded"], 2);
}

#[tokio::test]
async fn test_models_refreshes_lazily_with_default_first() {
    let backend = MockBackend::new().with_models(&["zephyr", "llama3", "mistral"]);
    let config = AppConfig {
        default_model: Some("mistral".to_string()),
        ..Default::default()
    };
    let t = test_app(Arc::new(backend.clone()), config);
    assert_eq!(backend.list_count(), 0);

    let (status, body) = send_json(&t.app, get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["mistral", "llama3", "zephyr"]);
    assert_eq!(body[0]["context_limit"], 4096);

    // Loaded catalog is reused
    send_json(&t.app, get("/models")).await;
    assert_eq!(backend.list_count(), 1);
}

#[tokio::test]
async fn test_models_empty_when_backend_down() {
    let backend = MockBackend::new();
    backend.fail_listing(ApiError::Network("connection refused".to_string()));
    let t = test_app(Arc::new(backend), AppConfig::default());

    let (status, body) = send_json(&t.app, get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_refresh_models_reports_count() {
    let backend = MockBackend::new().with_models(&["llama3"]);
    let t = test_app(Arc::new(backend.clone()), AppConfig::default());

    let (status, body) = send_json(&t.app, post_json("/refresh-models", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Models refreshed");
    assert_eq!(body["count"], 1);

    backend.fail_listing(ApiError::Timeout);
    let (_, body) = send_json(&t.app, post_json("/refresh-models", json!({}))).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_config_passes_unknown_keys_through() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("app_config.json");
    std::fs::write(
        &config_path,
        r#"{"ollama_base_url": "http://gpu-box:11434", "summary_model_name": "tinyllama", "theme": "dark"}"#,
    )
    .unwrap();
    let config = AppConfig::load_or_default(&config_path);
    let t = test_app(Arc::new(MockBackend::new()), config);

    let (status, body) = send_json(&t.app, get("/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ollama_base_url"], "http://gpu-box:11434");
    assert_eq!(body["summary_model_name"], "tinyllama");
    assert_eq!(body["theme"], "dark");
}

#[tokio::test]
async fn test_config_serves_null_keys() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("app_config.json");
    std::fs::write(
        &config_path,
        r#"{"default_model": null, "summary_model_name": "tinyllama"}"#,
    )
    .unwrap();
    let t = test_app(
        Arc::new(MockBackend::new()),
        AppConfig::load_or_default(&config_path),
    );

    let (status, body) = send_json(&t.app, get("/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"default_model": null, "summary_model_name": "tinyllama"}));
}

#[tokio::test]
async fn test_chat_returns_turn_result() {
    let backend = MockBackend::new()
        .with_models(&["llama3"])
        .with_reply("Hello!", 5, 3);
    let t = test_app(Arc::new(backend.clone()), AppConfig::default());

    let (status, body) = send_json(
        &t.app,
        post_json(
            "/chat",
            json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "Hi"}],
                "temperature": null,
                "max_tokens": 0
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello!");
    assert_eq!(body["usage"]["total_tokens"], 8);
    assert_eq!(body["estimated_cost"], 0.0);
    assert_eq!(body["ollama_stats"]["eval_count"], 3);
    assert!(body["summary"].is_null());

    let sent = &backend.recorded_requests()[0];
    assert!((sent.temperature - 0.7).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_chat_relays_backend_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'nope' not found"))
        .mount(&server)
        .await;

    let t = test_app(
        Arc::new(OllamaBackend::with_base_url(server.uri())),
        AppConfig::default(),
    );
    let (status, body) = send_json(
        &t.app,
        post_json("/chat", json!({"model": "nope", "messages": []})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Ollama API Error: model 'nope' not found");
}

#[tokio::test]
async fn test_chat_connection_failure_is_bad_gateway() {
    let backend = MockBackend::new().with_failure(ApiError::Network("refused".to_string()));
    let t = test_app(Arc::new(backend), AppConfig::default());

    let (status, body) = send_json(
        &t.app,
        post_json("/chat", json!({"model": "llama3", "messages": []})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("refused"));
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let t = test_app(Arc::new(MockBackend::new()), AppConfig::default());
    let (status, _) = send(&t.app, post_json("/chat", json!({"messages": []}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_index_and_static_assets() {
    let t = test_app(Arc::new(MockBackend::new()), AppConfig::default());

    let (status, _) = send(&t.app, get("/")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let static_dir = t.temp.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>relay</h1>").unwrap();
    std::fs::write(static_dir.join("script.js"), "console.log(1);").unwrap();

    let (status, body) = send(&t.app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>relay</h1>");

    let (status, body) = send(&t.app, get("/static/script.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log(1);");
}

#[tokio::test]
async fn test_chat_forwards_negative_max_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"options": {"num_predict": -1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "unbounded"},
            "prompt_eval_count": 2,
            "eval_count": 9
        })))
        .expect(1)
        .mount(&server)
        .await;

    let t = test_app(
        Arc::new(OllamaBackend::with_base_url(server.uri())),
        AppConfig::default(),
    );
    let (status, body) = send_json(
        &t.app,
        post_json(
            "/chat",
            json!({"model": "llama3", "messages": [], "max_tokens": -1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "unbounded");
    assert_eq!(body["usage"]["total_tokens"], 11);
}
