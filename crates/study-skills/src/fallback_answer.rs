//! Fallback skill: answers from the curated knowledge table.

use std::sync::Arc;
use study_core::{
    AgentSkill, BoxError, KnowledgeTable, RequestContext, DEFAULT_ANSWER, FALLBACK_SKILL,
};

pub struct FallbackAnswer {
    table: Arc<KnowledgeTable>,
}

impl FallbackAnswer {
    pub fn new(table: Arc<KnowledgeTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl AgentSkill for FallbackAnswer {
    fn name(&self) -> &str {
        FALLBACK_SKILL
    }

    async fn execute(
        &self,
        ctx: &RequestContext,
        payload: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, BoxError> {
        let question = payload
            .as_ref()
            .and_then(|p| p.get("question"))
            .and_then(|v| v.as_str())
            .ok_or("FallbackAnswer requires payload: { question: string }")?;

        let hit = self.table.lookup(question);
        match &hit {
            Some(m) => tracing::info!(
                target: "study::fallback",
                client = %ctx.client,
                correlation_id = %ctx.correlation_id(),
                entry = m.index,
                kind = ?m.kind,
                keyword = m.keyword.unwrap_or(""),
                "Fallback answer from knowledge table"
            ),
            None => tracing::info!(
                target: "study::fallback",
                client = %ctx.client,
                correlation_id = %ctx.correlation_id(),
                "No knowledge table match, using default answer"
            ),
        }

        Ok(serde_json::json!({
            "status": "ok",
            "skill": FALLBACK_SKILL,
            "answer": hit.map(|m| m.entry.answer.as_str()).unwrap_or(DEFAULT_ANSWER),
            "match": hit.map(|m| serde_json::json!(m.kind)).unwrap_or(serde_json::Value::Null),
            "entry_index": hit.map(|m| m.index),
        }))
    }
}
