//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::core::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "dine-server",
        "version": env!("CARGO_PKG_VERSION"),
        "ws_connections": state.hub.connection_count(),
    }))
}
