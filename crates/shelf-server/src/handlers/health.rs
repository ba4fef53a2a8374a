//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use shelf_core::AIBackend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub books: usize,
    pub ai: AiStatus,
}

#[derive(Debug, Serialize)]
pub struct AiStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// GET /api/health - Catalog size and AI configuration
///
/// Does not call the backend; the connectivity check runs once at startup.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let client = state.explainer.client();

    Json(HealthResponse {
        status: if state.catalog.is_empty() { "degraded" } else { "ok" },
        books: state.catalog.len(),
        ai: AiStatus {
            available: client.is_some(),
            backend: client.map(|c| c.backend_name()),
            model: client.map(|c| c.model().to_string()),
        },
    })
}
