//! Test utilities for shelf-core
//!
//! Mock model servers so every network backend can be exercised over real
//! HTTP in tests and during local development:
//! - [`MockGeminiServer`]: generative-language API
//! - [`MockCompletionServer`]: OpenAI-compatible and Ollama APIs on one port

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Marker line the translate prompt ends with
const TRANSLATE_MARKER: &str = "Translate this to Korean.";

#[derive(Clone)]
struct MockState {
    api_key: String,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

/// Mock generative-language server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port, accepting `api_key`
    pub async fn start(api_key: &str) -> Self {
        Self::start_with(api_key, false).await
    }

    /// Start a server whose generate endpoint always answers 500
    pub async fn start_failing(api_key: &str) -> Self {
        Self::start_with(api_key, true).await
    }

    async fn start_with(api_key: &str, failing: bool) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            api_key: api_key.to_string(),
            failing,
            calls: calls.clone(),
        };

        // `{model}:generateContent` is a single path segment
        let app = Router::new()
            .route(
                "/v1beta/models/:model",
                get(handle_model).post(handle_generate),
            )
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            calls,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generateContent requests received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serve `app` on an ephemeral port until the returned sender fires
async fn spawn(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

/// Deterministic answer for `prompt`: translate prompts get a `번역:` prefix,
/// anything else echoes its first line tagged with the model
fn canned_reply(prompt: &str, model: &str) -> String {
    let first_line = prompt
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    if prompt.contains(TRANSLATE_MARKER) {
        format!("번역: {}", first_line)
    } else {
        format!("{} (mock {})", first_line, model)
    }
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.api_key)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message}})),
    )
        .into_response()
}

/// Model metadata endpoint (health check)
async fn handle_model(
    State(state): State<MockState>,
    Path(model): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return error_body(StatusCode::FORBIDDEN, "API key not valid");
    }
    Json(json!({
        "name": format!("models/{}", model),
        "displayName": model,
    }))
    .into_response()
}

/// generateContent endpoint
async fn handle_generate(
    State(state): State<MockState>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(model) = action.strip_suffix(":generateContent") else {
        return error_body(StatusCode::NOT_FOUND, "Unknown method");
    };
    if !authorized(&state, &headers) {
        return error_body(StatusCode::FORBIDDEN, "API key not valid");
    }

    state.calls.fetch_add(1, Ordering::SeqCst);

    if state.failing {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
    }

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    let text = canned_reply(prompt, model);

    Json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
        }],
        "modelVersion": model,
    }))
    .into_response()
}

#[derive(Clone)]
struct CompletionState {
    api_key: Option<String>,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

/// Mock OpenAI-compatible and Ollama server
///
/// Serves `/v1/chat/completions`, `/v1/models`, `/api/generate` and
/// `/api/tags`. With an API key set, the OpenAI routes require a matching
/// bearer token.
pub struct MockCompletionServer {
    addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start a server that accepts any (or no) bearer token
    pub async fn start() -> Self {
        Self::start_with(None, false).await
    }

    /// Start a server whose OpenAI routes require `Bearer {api_key}`
    pub async fn start_with_key(api_key: &str) -> Self {
        Self::start_with(Some(api_key.to_string()), false).await
    }

    /// Start a server whose completion endpoints always answer 500
    pub async fn start_failing() -> Self {
        Self::start_with(None, true).await
    }

    async fn start_with(api_key: Option<String>, failing: bool) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = CompletionState {
            api_key,
            failing,
            calls: calls.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .route("/api/generate", post(handle_ollama_generate))
            .route("/api/tags", get(handle_tags))
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            calls,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of completion requests received (both APIs)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bearer_ok(state: &CompletionState, headers: &HeaderMap) -> bool {
    let Some(ref key) = state.api_key else {
        return true;
    };
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == key)
}

async fn handle_chat(
    State(state): State<CompletionState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&state, &headers) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    state.calls.fetch_add(1, Ordering::SeqCst);
    if state.failing {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
    }

    let model = body["model"].as_str().unwrap_or_default();
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": canned_reply(prompt, model)},
            "finish_reason": "stop",
        }],
    }))
    .into_response()
}

async fn handle_models(State(state): State<CompletionState>, headers: HeaderMap) -> Response {
    if !bearer_ok(&state, &headers) {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    Json(json!({"object": "list", "data": [{"id": "mock", "object": "model"}]})).into_response()
}

async fn handle_ollama_generate(
    State(state): State<CompletionState>,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if state.failing {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
    }

    let model = body["model"].as_str().unwrap_or_default();
    let prompt = body["prompt"].as_str().unwrap_or_default();
    Json(json!({
        "model": model,
        "response": canned_reply(prompt, model),
        "done": true,
    }))
    .into_response()
}

async fn handle_tags() -> Json<Value> {
    Json(json!({"models": [{"name": "llama3.2:latest"}]}))
}
