//! Ollama backend
//!
//! Local models through `POST /api/generate` with streaming off, so one
//! explanation is one JSON reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::http;
use super::AIBackend;

const PROVIDER: &str = "Ollama";

#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: http::build_client(),
            base_url: http::base_url(base_url),
            model: model.to_string(),
        }
    }

    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: Option<String>,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, host = %self.base_url, "Requesting Ollama generation");

        let request = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateBody {
                model: &self.model,
                prompt,
                stream: false,
            });
        let reply: GenerateReply = http::send(PROVIDER, request).await?.json().await?;
        http::non_empty(PROVIDER, reply.response)
    }

    /// The model list endpoint answers as soon as the daemon is up
    async fn health_check(&self) -> bool {
        http::answers_ok(self.http_client.get(format!("{}/api/tags", self.base_url))).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
