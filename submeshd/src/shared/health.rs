//! A minimal health endpoint for the background services that don't
//! otherwise serve HTTP. The manager exposes its own richer
//! `/health`/`/health/consumer` pair in `presentation::http`; the
//! scanner, downloader, translator and consumer bind this one instead,
//! on a private port, for operational parity with it.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

async fn health(service: &'static str) -> Json<Value> {
    Json(json!({ "status": "ok", "service": service }))
}

/// Binds `GET /health` on `addr` and serves it until the process exits.
/// Intended to be run under `tokio::spawn` alongside a binary's main
/// consumer loop.
pub async fn serve(addr: &str, service: &'static str) -> anyhow::Result<()> {
    let router = Router::new().route("/health", get(move || health(service)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
