//! HTTP server: activity routes, static UI assets and the tower-http stack

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{self, AppState};

/// Shown on `GET /` when the static directory has no index page
pub const GREETING: &str = "Hello from the SFMC Weather App!";

/// Journey Builder payloads are small; anything larger is not ours
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full application router
pub fn app(state: AppState) -> Router {
    let server = &state.config.server;
    let static_dir = Path::new(&server.static_dir);
    let index = static_dir.join("index.html");
    let timeout = Duration::from_secs(server.request_timeout_seconds.into());

    // Journey Builder loads the UI in an iframe from its own origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let root = if index.is_file() {
        Router::new().route_service("/", ServeFile::new(index))
    } else {
        Router::new().route("/", get(|| async { GREETING }))
    };

    root.merge(api::router(state.clone()))
        .fallback_service(ServeDir::new(static_dir))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until ctrl-c
pub async fn run(state: AppState) -> Result<()> {
    let server = state.config.server.clone();
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", server.host, server.port))?;
    let app = app(state);

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&server.tls_cert_path, &server.tls_key_path) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
            .await
            .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;

        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        info!("Weather decision activity listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTPS server error")?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Weather decision activity listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
