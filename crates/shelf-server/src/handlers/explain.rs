//! Explanation and question handlers
//!
//! Both endpoints always answer 200 with text: missing input, a missing
//! backend and backend failures all resolve to fixed Korean messages.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use shelf_core::import::parse_number;
use shelf_core::models::DEFAULT_STOCK_STATUS;
use shelf_core::{ExplainRequest, Surface};

/// Query parameters for an explanation
#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub title: Option<String>,
    pub original_title: Option<String>,
    /// Free-text stock status (default "Unknown")
    pub stock_status: Option<String>,
    /// Value score as sent by the frontend; unparseable values count as 0
    pub page_per_cost: Option<String>,
}

impl From<ExplainQuery> for ExplainRequest {
    fn from(query: ExplainQuery) -> Self {
        Self {
            title: query.title,
            original_title: query.original_title,
            stock_status: query
                .stock_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STOCK_STATUS.to_string()),
            page_per_cost: query
                .page_per_cost
                .as_deref()
                .and_then(parse_number)
                .unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

/// GET /api/explain - Korean explanation for a book
pub async fn explain(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExplainQuery>,
) -> Json<DescriptionResponse> {
    let request = ExplainRequest::from(query);
    let description = state
        .explainer
        .explain_text(&request, Surface::Online)
        .await;

    Json(DescriptionResponse { description })
}

#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// GET /api/ask - Answer a question, restated in Korean
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AskQuery>,
) -> Json<AnswerResponse> {
    let question = query.question.unwrap_or_default();
    let answer = state
        .explainer
        .ask(&question)
        .await
        .into_text(Surface::Online);

    Json(AnswerResponse { answer })
}
