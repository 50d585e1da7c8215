use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Bookmarks API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "auth": "/auth/signup, /auth/signin (public - token acquisition)",
                "users": "/users/me, /users (protected)",
                "bookmarks": "/bookmarks[/:id] (protected)",
            }
        }
    }))
}

/// GET /health - Liveness plus store connectivity; 503 when the store is unreachable
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let backend = state.store.backend_name();

    state.store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed for {} store: {}", backend, e);
        ApiError::service_unavailable(format!("{} store unavailable", backend))
    })?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "store": backend
        }
    })))
}
