//! study-core: shared types, configuration, the curated knowledge table with its
//! fallback answer resolver, and the skill orchestrator used by the gateway.

mod knowledge;
mod orchestrator;
mod shared;

pub use shared::{ChatMessage, CoreConfig, Goal, RequestContext, Sender, GREETING};

pub use knowledge::{
    KnowledgeEntry, KnowledgeError, KnowledgeMatch, KnowledgeTable, MatchKind, DEFAULT_ANSWER,
};

pub use orchestrator::{
    AgentSkill, BoxError, Orchestrator, SkillRegistry, FALLBACK_SKILL, MODEL_ROUTER_SKILL,
    VISION_SKILL,
};
