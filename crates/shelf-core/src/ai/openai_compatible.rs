//! Chat-completions backend
//!
//! For self-hosted models behind an OpenAI-style `/v1/chat/completions`
//! endpoint (vLLM, LocalAI, llama-server). Each explanation is one user turn;
//! the bearer token is only sent when configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::http;
use super::AIBackend;

const PROVIDER: &str = "chat-completions server";

#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: http::build_client(),
            base_url: http::base_url(base_url),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Same server, authenticated with `Authorization: Bearer <api_key>`
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[derive(Debug, Serialize)]
struct SingleTurnChat<'a> {
    model: &'a str,
    messages: [Turn<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> SingleTurnChat<'a> {
    fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [Turn {
                role: "user",
                content: prompt,
            }],
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatReplyChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

impl ChatReply {
    fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, host = %self.base_url, "Requesting chat completion");

        let request = self.authorized(
            self.http_client
                .post(format!("{}/v1/chat/completions", self.base_url))
                .json(&SingleTurnChat::new(&self.model, prompt)),
        );
        let reply: ChatReply = http::send(PROVIDER, request).await?.json().await?;
        http::non_empty(PROVIDER, reply.into_text())
    }

    /// `/v1/models` where implemented, `/health` on llama-server style hosts
    async fn health_check(&self) -> bool {
        let models = self.authorized(self.http_client.get(format!("{}/v1/models", self.base_url)));
        if http::answers_ok(models).await {
            return true;
        }
        http::answers_ok(self.http_client.get(format!("{}/health", self.base_url))).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
