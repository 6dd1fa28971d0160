//! Axum-based gateway for the Study Buddy chat page. Config-driven via CoreConfig.

mod handlers;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method},
    routing::{get, post},
    Json, Router,
};
use std::path::Path as StdPath;
use std::sync::Arc;
use study_core::{BoxError, CoreConfig, KnowledgeTable, Orchestrator, SkillRegistry, GREETING};
use study_skills::{
    FallbackAnswer, GeminiClient, GenerationConfig, LlmMode, ModelRouter, VisionExtract,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_knowledge(config: &CoreConfig) -> Result<KnowledgeTable, study_core::KnowledgeError> {
    KnowledgeTable::load(config.knowledge_path.as_deref().map(StdPath::new))
}

/// Pre-flight check: config loads, knowledge table is valid, port is available.
fn run_verify() -> Result<(), String> {
    print!("Loading config... ");
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;
    println!("OK ({} on port {}, llm_mode={})", config.app_name, config.port, config.llm_mode);

    print!("Checking knowledge table... ");
    let table = load_knowledge(&config).map_err(|e| format!("Knowledge table invalid: {}", e))?;
    println!("OK ({} entries)", table.len());

    if !config.is_mock() && config.resolved_api_key().trim().is_empty() {
        println!("WARN: GEMINI_API_KEY is not set; every answer will come from the knowledge table.");
    }

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\n✅ SUCCESS: All systems GO. Ready to start gateway.");
    Ok(())
}

/// Registers the text, vision, and fallback skills around one shared Gemini client.
fn build_orchestrator(
    config: &CoreConfig,
    gemini: GeminiClient,
    knowledge: Arc<KnowledgeTable>,
) -> Orchestrator {
    let mode = LlmMode::from_config(config);
    let mut registry = SkillRegistry::new();
    registry.register(Arc::new(ModelRouter::new(
        mode,
        gemini.clone(),
        GenerationConfig::from_config(config),
    )));
    registry.register(Arc::new(VisionExtract::new(mode, gemini)));
    registry.register(Arc::new(FallbackAnswer::new(knowledge)));
    Orchestrator::new(Arc::new(registry))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[study-gateway] .env not loaded: {} (using system environment)", e);
    }

    if std::env::args().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("❌ PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(CoreConfig::load()?);
    let knowledge = Arc::new(load_knowledge(&config)?);
    tracing::info!(
        entries = knowledge.len(),
        source = config.knowledge_path.as_deref().unwrap_or("built-in"),
        "Knowledge table loaded"
    );

    let gemini = GeminiClient::from_config(&config)?;
    if !config.is_mock() && !gemini.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; answers will come from the knowledge table");
    }
    let orchestrator = Arc::new(build_orchestrator(&config, gemini, Arc::clone(&knowledge)));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        orchestrator,
        knowledge,
    });

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("{} listening on {}", config.app_name, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn frontend_root_dir() -> std::path::PathBuf {
    // Prefer a working-directory relative path (run from workspace root), then the
    // workspace root relative to this manifest.
    let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let from_cwd = cwd.join("study-frontend");
    if from_cwd.exists() {
        return from_cwd;
    }

    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("study-frontend")
}

fn build_app(state: AppState) -> Router {
    let frontend_enabled = state.config.frontend_enabled;
    let upload_limit = state.config.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    let mut app = Router::new()
        .route("/v1/status", get(status))
        .route("/api/v1/health", get(health))
        .route("/api/v1/chat", post(handlers::chat::chat))
        .route(
            "/api/v1/vision",
            post(handlers::vision::vision).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state);

    if frontend_enabled {
        let frontend_dir = frontend_root_dir();
        app = app.route_service("/", ServeFile::new(frontend_dir.join("index.html")));
        app = app.nest_service("/ui", ServeDir::new(frontend_dir));
    }

    app.layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) orchestrator: Arc<Orchestrator>,
    pub(crate) knowledge: Arc<KnowledgeTable>,
}

/// GET /api/v1/health – liveness check for UI and scripts.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/status – app identity, LLM mode, knowledge table size, and the
/// greeting the chat page opens with.
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "app_name": state.config.app_name,
        "greeting": GREETING,
        "port": state.config.port,
        "llm_mode": LlmMode::from_config(&state.config).as_str(),
        "model": state.config.gemini_model,
        "knowledge_entries": state.knowledge.len(),
        "skills": state.orchestrator.skill_names(),
    }))
}
