use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service banner
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Welcome to Mini SIP Tracker API!",
        "name": "SIP Tracker API",
        "version": state.version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "create": "POST /sips/ (bearer token)",
            "summary": "GET /sips/summary[?as_of=YYYY-MM-DD] (bearer token)",
        }
    }))
}

/// GET /health - Liveness plus a store round-trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
