//! Routes goals to registered skills. Question answering goes to the LLM first and
//! drops to the curated knowledge table when the LLM fails.

use crate::shared::{Goal, RequestContext};
use std::fmt;
use std::sync::Arc;

/// Error type crossing the skill boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Skill that sends a prompt to the text-generation model.
pub const MODEL_ROUTER_SKILL: &str = "ModelRouter";
/// Skill that extracts text from an image with the vision model.
pub const VISION_SKILL: &str = "VisionExtract";
/// Skill that answers from the curated knowledge table.
pub const FALLBACK_SKILL: &str = "FallbackAnswer";

#[derive(Debug)]
struct UnknownSkill(String);

impl fmt::Display for UnknownSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown skill: {}", self.0)
    }
}

impl std::error::Error for UnknownSkill {}

/// Trait implemented by all assistant capabilities (skills).
#[async_trait::async_trait]
pub trait AgentSkill: Send + Sync {
    /// Unique skill name for routing.
    fn name(&self) -> &str;

    /// Executes the skill with the given context and optional payload.
    async fn execute(
        &self,
        ctx: &RequestContext,
        payload: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BoxError>;
}

/// Registry of skills that can be dispatched by name.
pub struct SkillRegistry {
    skills: Vec<Arc<dyn AgentSkill>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self { skills: Vec::new() }
    }

    pub fn register(&mut self, skill: Arc<dyn AgentSkill>) {
        self.skills.push(skill);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AgentSkill>> {
        self.skills.iter().find(|s| s.name() == name).cloned()
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name().to_string()).collect()
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatches goals to skills.
pub struct Orchestrator {
    registry: Arc<SkillRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<SkillRegistry>) -> Self {
        Self { registry }
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.registry.skill_names()
    }

    fn skill(&self, name: &str) -> Result<Arc<dyn AgentSkill>, UnknownSkill> {
        self.registry
            .get(name)
            .ok_or_else(|| UnknownSkill(name.to_string()))
    }

    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        goal: Goal,
    ) -> Result<serde_json::Value, BoxError> {
        match goal {
            Goal::ExecuteSkill { name, payload } => self.skill(&name)?.execute(ctx, payload).await,
            Goal::AnswerQuestion { content } => self.answer_question(ctx, content).await,
            Goal::ExtractText { image, mime_type } => {
                let payload = serde_json::json!({ "image": image, "mime_type": mime_type });
                self.skill(VISION_SKILL)?.execute(ctx, Some(payload)).await
            }
        }
    }

    /// LLM answer when available; on any LLM failure the knowledge table answers instead.
    async fn answer_question(
        &self,
        ctx: &RequestContext,
        content: String,
    ) -> Result<serde_json::Value, BoxError> {
        let router_payload = serde_json::json!({ "prompt": content });
        let llm_result = match self.skill(MODEL_ROUTER_SKILL) {
            Ok(router) => router.execute(ctx, Some(router_payload)).await,
            Err(e) => Err(e.into()),
        };

        let llm_error = match llm_result {
            Ok(result) => match result.get("generated").and_then(|v| v.as_str()) {
                Some(generated) => {
                    return Ok(serde_json::json!({
                        "status": "ok",
                        "answer": generated,
                        "source": "llm",
                    }));
                }
                None => format!("{} returned no generated text", MODEL_ROUTER_SKILL),
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            target: "study::fallback",
            client = %ctx.client,
            correlation_id = %ctx.correlation_id(),
            error = %llm_error,
            "LLM unavailable, answering from knowledge table"
        );

        let fallback = self.skill(FALLBACK_SKILL)?;
        let result = fallback
            .execute(ctx, Some(serde_json::json!({ "question": content })))
            .await?;
        let answer = result
            .get("answer")
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("{} did not return an answer", FALLBACK_SKILL))?;
        Ok(serde_json::json!({
            "status": "ok",
            "answer": answer,
            "source": "fallback",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticRouter {
        reply: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AgentSkill for StaticRouter {
        fn name(&self) -> &str {
            MODEL_ROUTER_SKILL
        }

        async fn execute(
            &self,
            _ctx: &RequestContext,
            payload: Option<serde_json::Value>,
        ) -> Result<serde_json::Value, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(payload.unwrap().get("prompt").is_some());
            match self.reply {
                Ok(text) => Ok(serde_json::json!({ "generated": text })),
                Err(e) => Err(e.into()),
            }
        }
    }

    struct CountingFallback {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AgentSkill for CountingFallback {
        fn name(&self) -> &str {
            FALLBACK_SKILL
        }

        async fn execute(
            &self,
            _ctx: &RequestContext,
            payload: Option<serde_json::Value>,
        ) -> Result<serde_json::Value, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let question = payload.unwrap()["question"].as_str().unwrap().to_string();
            Ok(serde_json::json!({ "answer": format!("canned: {}", question) }))
        }
    }

    fn orchestrator(
        reply: Result<&'static str, &'static str>,
    ) -> (Orchestrator, Arc<StaticRouter>, Arc<CountingFallback>) {
        let router = Arc::new(StaticRouter {
            reply,
            calls: AtomicUsize::new(0),
        });
        let fallback = Arc::new(CountingFallback {
            calls: AtomicUsize::new(0),
        });
        let mut registry = SkillRegistry::new();
        registry.register(Arc::clone(&router) as Arc<dyn AgentSkill>);
        registry.register(Arc::clone(&fallback) as Arc<dyn AgentSkill>);
        (Orchestrator::new(Arc::new(registry)), router, fallback)
    }

    #[tokio::test]
    async fn test_llm_success_skips_fallback() {
        let (orch, router, fallback) = orchestrator(Ok("llm says hi"));
        let goal = Goal::AnswerQuestion {
            content: "What is DNA?".to_string(),
        };
        let result = orch.dispatch(&RequestContext::new("test"), goal).await.unwrap();
        assert_eq!(result["answer"], "llm says hi");
        assert_eq!(result["source"], "llm");
        assert_eq!(router.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_uses_fallback_with_original_content() {
        let (orch, _router, fallback) = orchestrator(Err("quota exceeded"));
        let goal = Goal::AnswerQuestion {
            content: "What is DNA?".to_string(),
        };
        let result = orch.dispatch(&RequestContext::new("test"), goal).await.unwrap();
        assert_eq!(result["answer"], "canned: What is DNA?");
        assert_eq!(result["source"], "fallback");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_router_falls_back() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(CountingFallback {
            calls: AtomicUsize::new(0),
        }));
        let orch = Orchestrator::new(Arc::new(registry));
        let goal = Goal::AnswerQuestion {
            content: "x".to_string(),
        };
        let result = orch.dispatch(&RequestContext::new("test"), goal).await.unwrap();
        assert_eq!(result["source"], "fallback");
    }

    struct SilentFallback;

    #[async_trait::async_trait]
    impl AgentSkill for SilentFallback {
        fn name(&self) -> &str {
            FALLBACK_SKILL
        }

        async fn execute(
            &self,
            _ctx: &RequestContext,
            _payload: Option<serde_json::Value>,
        ) -> Result<serde_json::Value, BoxError> {
            Ok(serde_json::json!({ "status": "ok" }))
        }
    }

    #[tokio::test]
    async fn test_fallback_without_answer_is_an_error() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(SilentFallback));
        let orch = Orchestrator::new(Arc::new(registry));
        let goal = Goal::AnswerQuestion {
            content: "What is DNA?".to_string(),
        };
        let err = orch.dispatch(&RequestContext::new("test"), goal).await.unwrap_err();
        assert_eq!(err.to_string(), "FallbackAnswer did not return an answer");
    }

    #[tokio::test]
    async fn test_unknown_skill_is_an_error() {
        let orch = Orchestrator::new(Arc::new(SkillRegistry::new()));
        let goal = Goal::ExecuteSkill {
            name: "Nope".to_string(),
            payload: None,
        };
        let err = orch.dispatch(&RequestContext::new("test"), goal).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown skill: Nope");

        let err = orch
            .dispatch(
                &RequestContext::new("test"),
                Goal::ExtractText {
                    image: "aGk=".to_string(),
                    mime_type: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown skill: VisionExtract");
    }
}
