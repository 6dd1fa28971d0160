//! Curated study knowledge: the static question/answer table consulted when the
//! LLM cannot answer.
//!
//! ## Matching
//!
//! | Step | Rule                                                         |
//! |------|--------------------------------------------------------------|
//! | 1    | Exact: lowercased input equals an entry's lowercased question |
//! | 2    | Keyword: first entry (table order) with a keyword inside the lowercased input |
//! | 3    | Default: [`DEFAULT_ANSWER`]                                  |
//!
//! The table is built once at startup and shared read-only (`Arc<KnowledgeTable>`).

mod defaults;
mod table;

pub use table::{KnowledgeEntry, KnowledgeError, KnowledgeMatch, KnowledgeTable, MatchKind};

/// Returned when neither an exact nor a keyword match exists.
pub const DEFAULT_ANSWER: &str = "I don't have specific information about that yet. Could you rephrase your question or ask something about math, physics, biology, or history?";
