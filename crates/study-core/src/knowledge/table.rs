//! Ordered question/answer table and the exact-then-keyword resolver.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::defaults::STUDY_ENTRIES;
use super::DEFAULT_ANSWER;

/// One curated question with its canned answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Canonical phrasing; matched case-insensitively against the whole input.
    pub question: String,
    /// Returned verbatim (may contain line breaks and numbered points).
    pub answer: String,
    /// Any one of these appearing inside the lowercased input selects the entry.
    pub keywords: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid knowledge table JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("knowledge table has no entries")]
    EmptyTable,
    #[error("entry {index}: question is empty")]
    EmptyQuestion { index: usize },
    #[error("entry {index}: answer is empty")]
    EmptyAnswer { index: usize },
    #[error("entry {index}: at least one keyword is required")]
    NoKeywords { index: usize },
    #[error("entry {index}: keyword {position} is empty")]
    EmptyKeyword { index: usize, position: usize },
    #[error("duplicate question: {0:?}")]
    DuplicateQuestion(String),
}

/// How a question was resolved against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Keyword,
}

/// A table hit: the entry, its position, and the rule that selected it.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeMatch<'a> {
    pub index: usize,
    pub entry: &'a KnowledgeEntry,
    pub kind: MatchKind,
    /// The keyword that matched (as stored in the table); `None` for exact hits.
    pub keyword: Option<&'a str>,
}

#[derive(Debug)]
struct IndexedEntry {
    entry: KnowledgeEntry,
    question_lc: String,
    keywords_lc: Vec<String>,
}

impl IndexedEntry {
    fn new(entry: KnowledgeEntry) -> Self {
        let question_lc = entry.question.to_lowercase();
        let keywords_lc = entry.keywords.iter().map(|k| k.to_lowercase()).collect();
        Self {
            entry,
            question_lc,
            keywords_lc,
        }
    }
}

/// Immutable, ordered knowledge table. Built once, then shared by reference.
#[derive(Debug)]
pub struct KnowledgeTable {
    entries: Vec<IndexedEntry>,
}

impl KnowledgeTable {
    /// Validates and indexes `entries`, keeping their order.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, KnowledgeError> {
        if entries.is_empty() {
            return Err(KnowledgeError::EmptyTable);
        }
        let mut seen: HashSet<String> = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(KnowledgeError::EmptyQuestion { index });
            }
            if entry.answer.trim().is_empty() {
                return Err(KnowledgeError::EmptyAnswer { index });
            }
            if entry.keywords.is_empty() {
                return Err(KnowledgeError::NoKeywords { index });
            }
            if let Some(position) = entry.keywords.iter().position(|k| k.trim().is_empty()) {
                return Err(KnowledgeError::EmptyKeyword { index, position });
            }
            if !seen.insert(entry.question.to_lowercase()) {
                return Err(KnowledgeError::DuplicateQuestion(entry.question.clone()));
            }
        }
        Ok(Self::indexed(entries))
    }

    fn indexed(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(IndexedEntry::new).collect(),
        }
    }

    /// The built-in study table (math, history, biology, physics).
    pub fn study_defaults() -> Self {
        Self::indexed(
            STUDY_ENTRIES
                .iter()
                .map(|(question, answer, keywords)| KnowledgeEntry {
                    question: question.to_string(),
                    answer: answer.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        )
    }

    /// Parses a JSON array of `{question, answer, keywords}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeError> {
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Table from `path` when configured, otherwise [`KnowledgeTable::study_defaults`].
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        match path {
            Some(p) => Self::from_json_path(p),
            None => Ok(Self::study_defaults()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in priority order.
    pub fn entries(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter().map(|e| &e.entry)
    }

    /// Exact match first, then the first entry (in table order) with a keyword inside the input.
    /// Whitespace is not trimmed: only case is folded.
    pub fn lookup(&self, question: &str) -> Option<KnowledgeMatch<'_>> {
        let lowered = question.to_lowercase();

        let exact = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.question_lc == lowered)
            .map(|(index, e)| KnowledgeMatch {
                index,
                entry: &e.entry,
                kind: MatchKind::Exact,
                keyword: None,
            });
        if exact.is_some() {
            return exact;
        }

        self.entries.iter().enumerate().find_map(|(index, e)| {
            e.keywords_lc
                .iter()
                .position(|k| lowered.contains(k.as_str()))
                .map(|pos| KnowledgeMatch {
                    index,
                    entry: &e.entry,
                    kind: MatchKind::Keyword,
                    keyword: Some(e.entry.keywords[pos].as_str()),
                })
        })
    }

    /// Best canned answer for `question`, or [`DEFAULT_ANSWER`]. Total over all input.
    pub fn find_answer(&self, question: &str) -> &str {
        self.lookup(question)
            .map(|m| m.entry.answer.as_str())
            .unwrap_or(DEFAULT_ANSWER)
    }
}

impl Default for KnowledgeTable {
    fn default() -> Self {
        Self::study_defaults()
    }
}
