//! Vision handler: extracts the question text from an uploaded image or PDF.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use study_core::{Goal, RequestContext};
use study_skills::ImageError;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VisionRequest {
    /// Base64 payload or `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisionResponse {
    pub text: String,
}

/// POST /api/v1/vision
///
/// Uploads are validated by the vision skill; its `ImageError`s map to 400.
pub async fn vision(
    State(state): State<AppState>,
    body: Result<Json<VisionRequest>, JsonRejection>,
) -> Result<Json<VisionResponse>, ApiError> {
    let Json(req) = body?;
    let ctx = RequestContext::new("chat-ui");
    let image = req.image.unwrap_or_default();
    tracing::info!(
        target: "study::vision",
        client = %ctx.client,
        correlation_id = %ctx.correlation_id(),
        "Vision request received: {} chars",
        image.len()
    );

    let goal = Goal::ExtractText {
        image,
        mime_type: req.mime_type,
    };
    let result = state
        .orchestrator
        .dispatch(&ctx, goal)
        .await
        .map_err(|e| match e.downcast_ref::<ImageError>() {
            Some(invalid) => ApiError::bad_request(invalid.to_string()),
            None => {
                tracing::error!(target: "study::vision", correlation_id = %ctx.correlation_id(), "Error in vision extraction: {}", e);
                ApiError::internal(e.to_string())
            }
        })?;

    let text = result
        .get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::internal("No text extracted"))?
        .to_string();
    Ok(Json(VisionResponse { text }))
}
