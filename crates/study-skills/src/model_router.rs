//! Model Router skill: wraps a student's question in the study prompt and asks
//! Gemini (or the offline mock) for a short answer.

use study_core::{AgentSkill, BoxError, CoreConfig, RequestContext, MODEL_ROUTER_SKILL};

use crate::gemini::{GeminiClient, GeminiError, GenerationConfig, Part};

/// Prepended to every question sent to the model.
pub const STUDY_PROMPT_PREFIX: &str = "You are a concise study assistant for students. Provide direct, clear answers to this question in 3-5 sentences maximum. Be precise and focused. Don't include unnecessary introduction or conclusion: ";

/// Mode for LLM invocation: mock (offline deterministic text) or live (Gemini).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    Mock,
    #[default]
    Live,
}

impl LlmMode {
    pub fn from_config(config: &CoreConfig) -> Self {
        if config.is_mock() {
            LlmMode::Mock
        } else {
            LlmMode::Live
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Mock => "mock",
            LlmMode::Live => "live",
        }
    }
}

pub struct ModelRouter {
    mode: LlmMode,
    client: GeminiClient,
    generation: GenerationConfig,
}

impl ModelRouter {
    pub fn new(mode: LlmMode, client: GeminiClient, generation: GenerationConfig) -> Self {
        Self {
            mode,
            client,
            generation,
        }
    }

    pub fn study_prompt(question: &str) -> String {
        format!("{}{}", STUDY_PROMPT_PREFIX, question)
    }

    /// Offline answer that echoes the question so the chat flow can be exercised without a key.
    fn mock_generate(&self, question: &str) -> String {
        let preview = question
            .chars()
            .take(80)
            .chain(if question.chars().count() > 80 { "…" } else { "" }.chars())
            .collect::<String>();
        format!(
            "[Generated – Mock LLM]\n\nYou asked: {}\n\nThis is an offline study answer. Set llm_mode = \"live\" and GEMINI_API_KEY to get answers from Gemini.",
            preview
        )
    }

    pub async fn generate_answer(&self, question: &str) -> Result<String, GeminiError> {
        match self.mode {
            LlmMode::Mock => Ok(self.mock_generate(question)),
            LlmMode::Live => {
                let parts = [Part::text(Self::study_prompt(question))];
                let answer = self.client.generate(&parts, Some(self.generation)).await?;
                tracing::info!(
                    target: "study::chat",
                    model = %self.client.model(),
                    answer_chars = answer.chars().count(),
                    "Generated answer from Gemini"
                );
                Ok(answer)
            }
        }
    }
}

#[async_trait::async_trait]
impl AgentSkill for ModelRouter {
    fn name(&self) -> &str {
        MODEL_ROUTER_SKILL
    }

    async fn execute(
        &self,
        _ctx: &RequestContext,
        payload: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BoxError> {
        let prompt = payload
            .as_ref()
            .and_then(|p| p.get("prompt").or(p.get("content")))
            .and_then(|v| v.as_str())
            .ok_or("ModelRouter requires payload: { prompt: string }")?
            .to_string();

        let generated = self.generate_answer(&prompt).await?;

        Ok(serde_json::json!({
            "status": "ok",
            "skill": MODEL_ROUTER_SKILL,
            "mode": self.mode.as_str(),
            "generated": generated,
            "prompt_preview_len": prompt.len()
        }))
    }
}
