// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! HTTP surface of the relay
//!
//! Routes:
//! - `GET /` chat UI page
//! - `GET /static/*` UI assets
//! - `GET /config` application config
//! - `GET /models` model catalog (lazy refresh)
//! - `POST /chat` one chat turn
//! - `GET /health` liveness plus backend reachability
//! - `POST /refresh-models` forced catalog refresh

pub mod error;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::chat::{ChatOrchestrator, ChatTurnRequest, ChatTurnResult};
use crate::config::{AppConfig, ContextLimits};
use crate::llm::backend::{BackendTimeouts, ChatBackend};
use crate::models::{ModelDescriptor, ModelRegistry};

use self::error::{error_response, internal_error};

/// Shared services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn ChatBackend>,
    pub registry: Arc<ModelRegistry>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn ChatBackend>,
        limits: ContextLimits,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::with_timeouts(config, backend, limits, static_dir, BackendTimeouts::default())
    }

    pub fn with_timeouts(
        config: AppConfig,
        backend: Arc<dyn ChatBackend>,
        limits: ContextLimits,
        static_dir: impl Into<PathBuf>,
        timeouts: BackendTimeouts,
    ) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(ModelRegistry::new(Arc::clone(&backend), limits));
        let orchestrator = Arc::new(
            ChatOrchestrator::new(Arc::clone(&backend), Arc::clone(&registry), Arc::clone(&config))
                .with_timeouts(timeouts),
        );
        Self {
            config,
            backend,
            registry,
            orchestrator,
            static_dir: static_dir.into(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub ollama_status: String,
    pub ollama_url: String,
    pub models_loaded: usize,
}

/// Body of `POST /refresh-models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub count: usize,
}

async fn index(State(state): State<AppState>) -> Response {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            internal_error(format!("UI page unavailable: {}", e))
        }
    }
}

async fn get_config(State(state): State<AppState>) -> Json<AppConfig> {
    Json(state.config.as_ref().clone())
}

async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelDescriptor>> {
    state.registry.ensure_loaded().await;
    Json(state.registry.list_sorted(state.config.default_model()).await)
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResult>, Response> {
    match state.orchestrator.handle_chat(request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::error!("Error in chat endpoint: {}", e);
            Err(error_response(&e))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend_health = state.backend.health().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Relay service is running".to_string(),
        ollama_status: backend_health.as_str().to_string(),
        ollama_url: state.backend.base_url().to_string(),
        models_loaded: state.registry.len().await,
    })
}

async fn refresh_models(State(state): State<AppState>) -> Json<RefreshResponse> {
    let snapshot = state.registry.refresh().await;
    Json(RefreshResponse {
        message: "Models refreshed".to_string(),
        count: snapshot.models.len(),
    })
}

/// Build the router over `state`
pub fn build_app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(index))
        .route("/config", get(get_config))
        .route("/models", get(list_models))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/refresh-models", post(refresh_models))
        .nest_service("/static", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
