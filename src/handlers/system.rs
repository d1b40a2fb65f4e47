// handlers/system.rs - Index and health endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Profiles API",
        "version": version,
        "endpoints": {
            "hello_view": "/hello-view/ (public)",
            "hello_viewset": "/hello-viewset/[:id/] (public)",
            "login": "/login/ (public - token acquisition)",
            "profiles": "/profiles/[:id/] (read and register public, writes owner only)",
            "feed": "/feed/[:id/] (authenticated, writes owner only)",
            "health": "/health (public)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": backend,
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "store_error": e.to_string(),
                })),
            )
        }
    }
}
