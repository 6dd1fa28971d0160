//! Local axum server standing in for the Gemini API in tests.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: serde_json::Value,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct FakeGemini {
    base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeGemini {
    /// Starts a server that answers every request with `status` and `reply`.
    pub async fn replying(status: StatusCode, reply: serde_json::Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            reply,
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(capture).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// A successful `generateContent` body carrying `text`.
    pub fn text_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn capture(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.requests.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body,
    });
    (state.status, Json(state.reply))
}
