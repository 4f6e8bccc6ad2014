// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ollama-relay - web relay for a local Ollama server
//!
//! Entry point for the relay binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use ollama_relay::cli::Cli;
use ollama_relay::config::{AppConfig, ContextLimits};
use ollama_relay::llm::providers::OllamaBackend;
use ollama_relay::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    // `-v` turns on relay diagnostics; `-vv` adds HTTP request traces.
    // `RUST_LOG` directives still apply.
    let directives: &[&str] = match cli.verbose {
        0 => &[],
        1 => &["ollama_relay=debug"],
        _ => &["ollama_relay=trace", "tower_http=debug"],
    };
    for directive in directives {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::load_or_default(&cli.config);
    let backend = Arc::new(OllamaBackend::with_base_url(config.base_url()));
    let state = AppState::new(
        config,
        backend,
        ContextLimits::new(&cli.context_limits),
        &cli.static_dir,
    );

    // Load models on startup; an unreachable backend is not fatal
    let snapshot = state.registry.refresh().await;
    if !snapshot.loaded {
        tracing::warn!(
            "No models loaded from {}. Serving with an empty catalog.",
            state.backend.base_url()
        );
    }

    let addr = cli.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    server::serve(listener, server::build_app(state))
        .await
        .context("server error")?;

    Ok(())
}
