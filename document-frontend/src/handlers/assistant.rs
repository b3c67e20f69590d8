//! Search and question answering endpoints.

use crate::models::{Answer, SearchHit};
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 500))]
    pub query: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 20))]
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    /// Restrict the answer to these documents.
    #[serde(default)]
    pub doc_ids: Option<Vec<String>>,
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    request.validate()?;

    let results = state
        .workspace
        .search(&request.query, request.top_k)
        .await?;

    Ok(Json(SearchResponse {
        query: request.query,
        results,
    }))
}

pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, AppError> {
    request.validate()?;
    let answer = state
        .workspace
        .ask(&request.question, request.doc_ids.as_deref())
        .await?;
    Ok(Json(answer))
}
