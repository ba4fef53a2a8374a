//! Pluggable text-completion backend abstraction
//!
//! Everything the catalog needs from a model is a single operation: send a
//! prompt, get text back. Backends differ only in wire format.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`,
//!   `OllamaBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_config(&config.ai);
//!
//! if let Some(ref client) = ai {
//!     let text = client.complete("Describe Watchmen in one sentence").await?;
//!     println!("{}", text);
//! }
//! ```
//!
//! See [`crate::config`] for the environment variables that select and
//! configure a backend.

mod gemini;
mod http;
mod mock;
mod ollama;
mod openai_compatible;

pub use gemini::GeminiBackend;
pub use http::CONNECT_TIMEOUT;
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use tracing::info;

use crate::config::{AiConfig, BackendKind};
use crate::error::Result;

/// Trait defining the interface for all text-completion backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send a single-turn prompt and return the generated text
    ///
    /// Fails on transport errors, non-success statuses, and responses that
    /// carry no text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google generative-language API
    Gemini(GeminiBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build a client for the configured backend
    ///
    /// Returns None when AI is disabled or the backend's required credential
    /// or host is missing. That is not an error: callers fall back to the
    /// "unavailable" text.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let model = config.model_or_default();

        match config.backend {
            BackendKind::Gemini => {
                let Some(api_key) = config.api_key.as_deref() else {
                    info!("GOOGLE_API_KEY not set, AI explanations disabled");
                    return None;
                };
                let mut backend = GeminiBackend::new(api_key, model);
                if let Some(host) = config.host.as_deref() {
                    backend = backend.with_base_url(host);
                }
                Some(AIClient::Gemini(backend))
            }
            BackendKind::OpenAICompatible => {
                let Some(host) = config.host.as_deref() else {
                    info!("OPENAI_COMPATIBLE_HOST not set, AI explanations disabled");
                    return None;
                };
                let backend = match config.api_key.as_deref() {
                    Some(key) => OpenAICompatibleBackend::with_api_key(host, model, key),
                    None => OpenAICompatibleBackend::new(host, model),
                };
                Some(AIClient::OpenAICompatible(backend))
            }
            BackendKind::Ollama => {
                let Some(host) = config.host.as_deref() else {
                    info!("OLLAMA_HOST not set, AI explanations disabled");
                    return None;
                };
                Some(AIClient::Ollama(OllamaBackend::new(host, model)))
            }
            BackendKind::Mock => Some(AIClient::Mock(MockBackend::new())),
            BackendKind::Disabled => {
                info!("AI backend disabled by configuration");
                None
            }
        }
    }

    /// Create an AI client from embedded defaults and environment variables
    pub fn from_env() -> Option<Self> {
        Self::from_config(&AiConfig::from_env())
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name (for health output)
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Gemini(_) => BackendKind::Gemini.as_str(),
            AIClient::OpenAICompatible(_) => BackendKind::OpenAICompatible.as_str(),
            AIClient::Ollama(_) => BackendKind::Ollama.as_str(),
            AIClient::Mock(_) => BackendKind::Mock.as_str(),
        }
    }

    /// Create a new instance with a different model
    ///
    /// Used for runtime model override (e.g. `shelf ai-test --model ...`)
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Gemini(b) => AIClient::Gemini(b.with_model(model)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.complete(prompt).await,
            AIClient::OpenAICompatible(b) => b.complete(prompt).await,
            AIClient::Ollama(b) => b.complete(prompt).await,
            AIClient::Mock(b) => b.complete(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
