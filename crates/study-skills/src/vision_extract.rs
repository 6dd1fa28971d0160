//! Vision skill: reads the question out of a photographed page or PDF.

use base64::{engine::general_purpose::STANDARD, Engine};
use study_core::{AgentSkill, BoxError, RequestContext, VISION_SKILL};

use crate::gemini::{GeminiClient, GeminiError, Part};
use crate::model_router::LlmMode;

pub const EXTRACTION_PROMPT: &str = "Extract all text from this image. If it's a question, just provide the complete question without any additional commentary.";

/// Returned by the mock mode so the upload flow can be tried offline.
pub const MOCK_EXTRACTED_TEXT: &str = "What is the process of photosynthesis and how do plants convert light energy into chemical energy?";

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("No image provided")]
    Missing,
    #[error("Image is not valid base64")]
    InvalidBase64,
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
}

/// Upload ready to be sent as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

/// Accepts raw base64 or a `data:<mime>;base64,<data>` URL. An explicit `mime_type`
/// wins over the data URL; with neither, `image/jpeg` is assumed.
pub fn normalize_image(image: &str, mime_type: Option<&str>) -> Result<InlineImage, ImageError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ImageError::Missing);
    }

    let (url_mime, payload) = match image.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or(ImageError::InvalidBase64)?;
            let mut fields = meta.split(';');
            let mime = fields.next().filter(|m| !m.is_empty());
            if !fields.any(|f| f.eq_ignore_ascii_case("base64")) {
                return Err(ImageError::InvalidBase64);
            }
            (mime, data)
        }
        None => (None, image),
    };

    let mime = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or(url_mime)
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_ascii_lowercase();
    if !(mime.starts_with("image/") || mime == "application/pdf") {
        return Err(ImageError::UnsupportedType(mime));
    }

    let data: String = payload.split_ascii_whitespace().collect();
    let decoded = STANDARD.decode(&data).map_err(|_| ImageError::InvalidBase64)?;
    if decoded.is_empty() {
        return Err(ImageError::Missing);
    }

    Ok(InlineImage {
        data,
        mime_type: mime,
    })
}

pub struct VisionExtract {
    mode: LlmMode,
    client: GeminiClient,
}

impl VisionExtract {
    pub fn new(mode: LlmMode, client: GeminiClient) -> Self {
        Self { mode, client }
    }

    /// Text found in the image, verbatim.
    pub async fn extract_text(&self, image: &InlineImage) -> Result<String, GeminiError> {
        if self.mode == LlmMode::Mock {
            return Ok(MOCK_EXTRACTED_TEXT.to_string());
        }
        let parts = [
            Part::text(EXTRACTION_PROMPT),
            Part::inline(image.mime_type.clone(), image.data.clone()),
        ];
        let text = self.client.generate(&parts, None).await?;
        tracing::info!(
            target: "study::vision",
            mime_type = %image.mime_type,
            text_chars = text.chars().count(),
            "Extracted text from upload"
        );
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AgentSkill for VisionExtract {
    fn name(&self) -> &str {
        VISION_SKILL
    }

    async fn execute(
        &self,
        _ctx: &RequestContext,
        payload: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BoxError> {
        let payload = payload.unwrap_or_default();
        let image = payload
            .get("image")
            .and_then(|v| v.as_str())
            .ok_or("VisionExtract requires payload: { image: base64 string }")?;
        let mime_type = payload.get("mime_type").and_then(|v| v.as_str());
        let image = normalize_image(image, mime_type)?;

        let text = self.extract_text(&image).await?;
        Ok(serde_json::json!({
            "status": "ok",
            "skill": VISION_SKILL,
            "mode": self.mode.as_str(),
            "text": text,
        }))
    }
}
