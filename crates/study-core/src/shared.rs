//! Shared types used across all Study Buddy crates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// First bubble shown in a fresh chat transcript.
pub const GREETING: &str = "Hi there! I'm Study Buddy, your AI study assistant. Ask me any academic questions you have, and I'll do my best to help you learn!";

const ENV_CONFIG_PATH: &str = "STUDY_CONFIG";
const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const DEFAULT_CONFIG_PATH: &str = "config/gateway";

/// Per-request context handed to every skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Caller label used in logs (e.g. "chat-ui").
    pub client: String,
    /// Optional correlation id for request tracing.
    pub correlation_id: Option<String>,
}

impl RequestContext {
    /// Context with a fresh v4 correlation id.
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            correlation_id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn correlation_id(&self) -> &str {
        self.correlation_id.as_deref().unwrap_or("-")
    }
}

/// High-level goals the orchestrator can delegate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Goal {
    /// Execute a named skill with optional payload.
    ExecuteSkill { name: String, payload: Option<serde_json::Value> },
    /// Answer a student's question: LLM first, curated knowledge table when the LLM fails.
    AnswerQuestion { content: String },
    /// Extract the text of an uploaded image or PDF (base64) with the vision model.
    ExtractText { image: String, mime_type: Option<String> },
}

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One bubble in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, content)
    }
}

/// Gateway configuration. Load from TOML and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown by `/v1/status`.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// "live" calls Gemini, "mock" answers offline.
    pub llm_mode: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    /// Falls back to the `GEMINI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Body limit for uploads sent to the vision endpoint.
    pub max_upload_bytes: usize,
    /// If true, the gateway serves the chat page from `study-frontend/`.
    #[serde(default)]
    pub frontend_enabled: bool,
    /// Optional JSON file replacing the built-in knowledge table.
    #[serde(default)]
    pub knowledge_path: Option<String>,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: `STUDY__*` env > file at
    /// `STUDY_CONFIG` (or `config/gateway.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`CoreConfig::load`] with an explicit file path (extension optional, file optional).
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("app_name", "Study Buddy")?
            .set_default("port", 8001_i64)?
            .set_default("llm_mode", "live")?
            .set_default("gemini_model", "gemini-1.5-flash")?
            .set_default(
                "gemini_api_base",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("max_output_tokens", 250_i64)?
            .set_default("temperature", 0.4_f64)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("max_upload_bytes", 10_i64 * 1024 * 1024)?
            .set_default("frontend_enabled", false)?;

        let built = builder
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("STUDY").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// API key from config, then `GEMINI_API_KEY`; empty when neither is set.
    pub fn resolved_api_key(&self) -> String {
        self.gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(ENV_GEMINI_API_KEY).ok())
            .unwrap_or_default()
    }

    pub fn is_mock(&self) -> bool {
        self.llm_mode.eq_ignore_ascii_case("mock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    /// Environment is process-wide; tests that load config or read env hold this.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
        assert_eq!(config.app_name, "Study Buddy");
        assert_eq!(config.port, 8001);
        assert_eq!(config.llm_mode, "live");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.max_output_tokens, 250);
        assert!((config.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.frontend_enabled);
        assert!(config.knowledge_path.is_none());
    }

    #[test]
    fn test_load_from_toml_overrides_defaults() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "app_name = \"Exam Helper\"\nport = 8042\nllm_mode = \"mock\"\nfrontend_enabled = true\nknowledge_path = \"kb.json\""
        )
        .unwrap();
        let config = CoreConfig::load_from(file.path()).unwrap();
        assert_eq!(config.app_name, "Exam Helper");
        assert_eq!(config.port, 8042);
        assert!(config.is_mock());
        assert!(config.frontend_enabled);
        assert_eq!(config.knowledge_path.as_deref(), Some("kb.json"));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_configured_api_key_wins() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let mut config = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
        config.gemini_api_key = Some("from-config".to_string());
        assert_eq!(config.resolved_api_key(), "from-config");
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 8042\nllm_mode = \"live\"\napp_name = \"From File\"").unwrap();

        std::env::set_var("STUDY__PORT", "8099");
        std::env::set_var("STUDY__LLM_MODE", "mock");
        let loaded = CoreConfig::load_from(file.path());
        std::env::remove_var("STUDY__PORT");
        std::env::remove_var("STUDY__LLM_MODE");

        let config = loaded.unwrap();
        assert_eq!(config.port, 8099);
        assert!(config.is_mock());
        assert_eq!(config.app_name, "From File");
        assert_eq!(config.max_output_tokens, 250);
    }

    #[test]
    fn test_api_key_falls_back_to_gemini_env() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let mut config = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
        let saved = std::env::var(ENV_GEMINI_API_KEY).ok();

        std::env::set_var(ENV_GEMINI_API_KEY, "from-env");
        config.gemini_api_key = None;
        let unset = config.resolved_api_key();
        config.gemini_api_key = Some("   ".to_string());
        let blank = config.resolved_api_key();
        std::env::remove_var(ENV_GEMINI_API_KEY);
        let missing = config.resolved_api_key();

        if let Some(key) = saved {
            std::env::set_var(ENV_GEMINI_API_KEY, key);
        }
        assert_eq!(unset, "from-env");
        assert_eq!(blank, "from-env");
        assert_eq!(missing, "");
    }

    #[test]
    fn test_chat_message_serializes_sender_lowercase() {
        let msg = ChatMessage::bot("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["content"], "hello");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
        assert_ne!(ChatMessage::user("a").id, ChatMessage::user("a").id);
    }
}
