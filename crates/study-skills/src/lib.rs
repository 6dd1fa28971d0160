//! Concrete study-assistant skills: Gemini text and vision calls, plus the
//! knowledge-table fallback.

pub use study_core::{AgentSkill, SkillRegistry};

mod fallback_answer;
mod gemini;
mod model_router;
mod vision_extract;

#[cfg(test)]
mod test_support;

pub use fallback_answer::FallbackAnswer;
pub use gemini::{GeminiClient, GeminiError, GenerationConfig, InlineData, Part};
pub use model_router::{LlmMode, ModelRouter, STUDY_PROMPT_PREFIX};
pub use vision_extract::{
    normalize_image, ImageError, InlineImage, VisionExtract, DEFAULT_IMAGE_MIME,
    EXTRACTION_PROMPT, MOCK_EXTRACTED_TEXT,
};
