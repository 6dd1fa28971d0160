//! Chat handler: asks the orchestrator for an answer (LLM first, knowledge table on
//! LLM failure) and returns it with the bot transcript record.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use study_core::{ChatMessage, Goal, RequestContext};

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Bot bubble ready for the transcript.
    pub message: ChatMessage,
}

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body?;
    let ctx = RequestContext::new("chat-ui");
    tracing::info!(
        target: "study::chat",
        client = %ctx.client,
        correlation_id = %ctx.correlation_id(),
        "Chat request received: {} chars",
        req.content.chars().count()
    );

    let result = state
        .orchestrator
        .dispatch(&ctx, Goal::AnswerQuestion { content: req.content })
        .await
        .map_err(|e| {
            tracing::error!(target: "study::chat", correlation_id = %ctx.correlation_id(), "Chat error: {}", e);
            ApiError::internal(e.to_string())
        })?;

    let answer = result
        .get("answer")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::internal("No answer generated"))?
        .to_string();
    tracing::info!(
        target: "study::chat",
        correlation_id = %ctx.correlation_id(),
        source = result.get("source").and_then(|v| v.as_str()).unwrap_or("unknown"),
        "Chat answer ready"
    );

    Ok(Json(ChatResponse {
        message: ChatMessage::bot(answer.clone()),
        answer,
    }))
}
