//! Korean book explanations
//!
//! Two layers:
//! - [`build_prompt`]: a pure function from book fields to the prompt text
//! - [`Explainer`]: sends prompts to the configured backend and turns every
//!   failure into a fixed Korean fallback string
//!
//! The generator never surfaces an error to its caller. A missing title
//! short-circuits before any backend call, a missing backend answers with the
//! "unavailable" text, and transport failures, timeouts or empty responses are
//! logged and replaced with the surface's failure text.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ai::{AIBackend, AIClient};
use crate::error::{Error, Result};
use crate::models::{select_title, BookRecord, StockStatus, DEFAULT_STOCK_STATUS};
use crate::prompts::{Prompt, PromptId, PromptLibrary};

/// Placeholder when neither title nor original title is usable
pub const MISSING_TITLE_MESSAGE: &str = "정보가 부족하여 설명을 생성할 수 없습니다.";

/// Fallback for the interactive (HTTP/CLI) path
pub const ONLINE_FAILURE_MESSAGE: &str = "AI 통신 중 오류가 발생했습니다.";

/// Fallback stored in the exported catalog
pub const BATCH_FAILURE_MESSAGE: &str = "설명을 생성하는 중 오류가 발생했습니다.";

/// Answer when no backend is configured
pub const UNAVAILABLE_MESSAGE: &str = "AI 설명 기능을 현재 사용할 수 없습니다.";

/// Scores above this are framed as good value
pub const GOOD_VALUE_THRESHOLD: f64 = 1.0;

/// Everything needed to describe one book
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainRequest {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub stock_status: String,
    pub page_per_cost: f64,
}

impl Default for ExplainRequest {
    fn default() -> Self {
        Self {
            title: None,
            original_title: None,
            stock_status: DEFAULT_STOCK_STATUS.to_string(),
            page_per_cost: 0.0,
        }
    }
}

impl ExplainRequest {
    pub fn from_book(book: &BookRecord) -> Self {
        Self {
            title: Some(book.title.clone()),
            original_title: Some(book.original_title.clone()),
            stock_status: book.stock_status.clone(),
            page_per_cost: book.page_per_cost,
        }
    }

    /// Title to send to the model, if any
    pub fn query_title(&self) -> Option<&str> {
        select_title(self.title.as_deref(), self.original_title.as_deref())
    }
}

/// Render the explanation prompt for one book
///
/// Deterministic: the same inputs always produce the same text.
pub fn build_prompt(template: &Prompt, title: &str, stock_status: &str, page_per_cost: f64) -> String {
    let score = format!("{:.2}", page_per_cost);

    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("title", title);
    vars.insert("stock_status", stock_status);
    vars.insert("page_per_cost", score.as_str());

    let stock_flag = match StockStatus::parse(stock_status) {
        StockStatus::InStock => "in_stock",
        StockStatus::OutOfStock => "out_of_stock",
        StockStatus::Other => "other_stock",
    };
    vars.insert(stock_flag, "true");

    if page_per_cost > GOOD_VALUE_THRESHOLD {
        vars.insert("good_value", "true");
    } else {
        vars.insert("pricey", "true");
    }

    template.render(&vars)
}

/// Where a generated text ends up; picks the fallback wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Returned directly to a user (HTTP, CLI)
    Online,
    /// Stored in the exported catalog
    Batch,
}

impl Surface {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Online => ONLINE_FAILURE_MESSAGE,
            Self::Batch => BATCH_FAILURE_MESSAGE,
        }
    }
}

/// Outcome of one generation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    /// Text from the backend
    Generated(String),
    /// Nothing to ask about; no backend call was made
    MissingInput,
    /// No backend configured; no call was made
    Unavailable,
    /// Backend call failed (already logged)
    Failed,
}

impl Explanation {
    /// Final user-facing text for a surface
    ///
    /// The batch surface trims generated text, the online surface returns it
    /// verbatim.
    pub fn into_text(self, surface: Surface) -> String {
        match self {
            Self::Generated(text) => match surface {
                Surface::Online => text,
                Surface::Batch => text.trim().to_string(),
            },
            Self::MissingInput => MISSING_TITLE_MESSAGE.to_string(),
            Self::Unavailable => UNAVAILABLE_MESSAGE.to_string(),
            Self::Failed => surface.failure_message().to_string(),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// Explanation generator over an optional backend
///
/// Prompt templates are resolved once at construction, so an `Explainer` can
/// be shared across tasks without locking.
#[derive(Clone)]
pub struct Explainer {
    client: Option<AIClient>,
    explain_prompt: Prompt,
    translate_prompt: Prompt,
    timeout: Duration,
}

impl Explainer {
    /// Create an explainer, loading templates (with overrides) from `prompts`
    pub fn new(client: Option<AIClient>, prompts: &mut PromptLibrary, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client,
            explain_prompt: prompts.get(PromptId::ExplainBook)?.clone(),
            translate_prompt: prompts.get(PromptId::TranslateKorean)?.clone(),
            timeout,
        })
    }

    /// Explainer with embedded templates only
    pub fn with_embedded_prompts(client: Option<AIClient>, timeout: Duration) -> Result<Self> {
        Self::new(client, &mut PromptLibrary::embedded_only(), timeout)
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check the backend within the generation timeout
    ///
    /// A check that outlives the timeout counts as unhealthy.
    pub async fn backend_healthy(&self) -> bool {
        let Some(ref client) = self.client else {
            return false;
        };
        match tokio::time::timeout(self.timeout, client.health_check()).await {
            Ok(healthy) => healthy,
            Err(_) => {
                warn!(host = client.host(), timeout = ?self.timeout, "AI health check timed out");
                false
            }
        }
    }

    /// Prompt that would be sent for `req`, or None when it has no title
    pub fn prompt_for(&self, req: &ExplainRequest) -> Option<String> {
        let title = req.query_title()?;
        Some(build_prompt(
            &self.explain_prompt,
            title,
            &req.stock_status,
            req.page_per_cost,
        ))
    }

    /// Generate an explanation for one book
    pub async fn explain(&self, req: &ExplainRequest) -> Explanation {
        let Some(prompt) = self.prompt_for(req) else {
            debug!("No title to explain, skipping generation");
            return Explanation::MissingInput;
        };
        let Some(ref client) = self.client else {
            return Explanation::Unavailable;
        };

        match self.complete(client, &prompt).await {
            Ok(text) => Explanation::Generated(text),
            Err(e) => {
                warn!(
                    title = req.query_title().unwrap_or_default(),
                    error = %e,
                    "Explanation generation failed"
                );
                Explanation::Failed
            }
        }
    }

    /// Generate an explanation and resolve it to text for `surface`
    pub async fn explain_text(&self, req: &ExplainRequest, surface: Surface) -> String {
        self.explain(req).await.into_text(surface)
    }

    /// Answer a free-form question, restated in Korean
    ///
    /// Two backend calls: the question itself, then a translation pass that
    /// transliterates proper nouns instead of translating them.
    pub async fn ask(&self, question: &str) -> Explanation {
        let question = question.trim();
        if question.is_empty() {
            return Explanation::MissingInput;
        }
        let Some(ref client) = self.client else {
            return Explanation::Unavailable;
        };

        match self.ask_korean(client, question).await {
            Ok(text) => Explanation::Generated(text),
            Err(e) => {
                warn!(error = %e, "Question answering failed");
                Explanation::Failed
            }
        }
    }

    async fn ask_korean(&self, client: &AIClient, question: &str) -> Result<String> {
        let answer = self.complete(client, question).await?;

        let mut vars = HashMap::new();
        vars.insert("text", answer.as_str());
        let translate = self.translate_prompt.render(&vars);

        self.complete(client, &translate).await
    }

    async fn complete(&self, client: &AIClient, prompt: &str) -> Result<String> {
        let text = tokio::time::timeout(self.timeout, client.complete(prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(Error::Ai("Empty completion".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn template() -> Prompt {
        Prompt::embedded(PromptId::ExplainBook).unwrap()
    }

    fn explainer(mock: &MockBackend) -> Explainer {
        Explainer::with_embedded_prompts(Some(AIClient::Mock(mock.clone())), TIMEOUT).unwrap()
    }

    fn explainer_with_client(client: AIClient) -> Explainer {
        Explainer::with_embedded_prompts(Some(client), TIMEOUT).unwrap()
    }

    fn request(title: &str, original: &str) -> ExplainRequest {
        ExplainRequest {
            title: Some(title.to_string()),
            original_title: Some(original.to_string()),
            ..ExplainRequest::default()
        }
    }

    #[test]
    fn test_build_prompt_out_of_stock() {
        let prompt = build_prompt(&template(), "Watchmen", "out of stock", 0.5);
        assert!(prompt.contains("'Watchmen'"));
        assert!(prompt.contains("OUT OF STOCK"));
        assert!(!prompt.contains("IN STOCK:"));
        assert!(prompt.contains("pricey"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_build_prompt_in_stock_good_value() {
        let prompt = build_prompt(&template(), "Akira", "In Stock", 2.0);
        assert!(prompt.contains("IN STOCK"));
        assert!(!prompt.contains("OUT OF STOCK"));
        assert!(prompt.contains("hyeoja"));
        assert!(!prompt.contains("pricey"));
        assert!(prompt.contains("2.00"));
    }

    #[test]
    fn test_build_prompt_other_stock_is_neutral() {
        let prompt = build_prompt(&template(), "Saga", "preorder", 1.0);
        assert!(prompt.contains("\"preorder\""));
        assert!(!prompt.contains("IN STOCK"));
        assert!(!prompt.contains("OUT OF STOCK"));
        // Exactly 1.0 is not above the threshold
        assert!(prompt.contains("pricey"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let a = build_prompt(&template(), "Akira", "in stock", 3.3333);
        let b = build_prompt(&template(), "Akira", "in stock", 3.3333);
        assert_eq!(a, b);
        assert!(a.contains("3.33"));
    }

    #[test]
    fn test_build_prompt_keeps_template_text_in_fields() {
        let title = "Saga {{stock_status}} {{page_per_cost}}";
        let first = build_prompt(&template(), title, "{{title}}", 2.0);
        for _ in 0..100 {
            assert_eq!(build_prompt(&template(), title, "{{title}}", 2.0), first);
        }
        assert!(first.starts_with(
            "Explain the comic book 'Saga {{stock_status}} {{page_per_cost}}' briefly in Korean."
        ));
        assert!(first.contains("The current stock status is: {{title}}."));
        assert!(first.contains("The page per cost value is: 2.00"));
    }

    #[test]
    fn test_prompt_for_prefers_original_title() {
        let explainer = Explainer::with_embedded_prompts(None, TIMEOUT).unwrap();
        let prompt = explainer.prompt_for(&request("왓치맨", "Watchmen")).unwrap();
        assert!(prompt.contains("'Watchmen'"));

        let prompt = explainer.prompt_for(&request("왓치맨", "")).unwrap();
        assert!(prompt.contains("'왓치맨'"));

        assert!(explainer.prompt_for(&ExplainRequest::default()).is_none());
    }

    #[tokio::test]
    async fn test_explain_missing_title_makes_no_call() {
        let mock = MockBackend::new();
        let explainer = explainer(&mock);

        let text = explainer
            .explain_text(&request("", ""), Surface::Online)
            .await;
        assert_eq!(text, MISSING_TITLE_MESSAGE);

        let text = explainer
            .explain_text(&ExplainRequest::default(), Surface::Batch)
            .await;
        assert_eq!(text, MISSING_TITLE_MESSAGE);

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_explain_generated() {
        let mock = MockBackend::new();
        let explainer = explainer(&mock);

        let result = explainer.explain(&request("왓치맨", "Watchmen")).await;
        match result {
            Explanation::Generated(text) => assert!(text.contains("Watchmen")),
            other => panic!("expected generated text, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_explain_failure_uses_fallback() {
        let mock = MockBackend::failing();
        let explainer = explainer(&mock);

        let online = explainer
            .explain_text(&request("X", ""), Surface::Online)
            .await;
        assert_eq!(online, ONLINE_FAILURE_MESSAGE);

        let batch = explainer
            .explain_text(&request("X", ""), Surface::Batch)
            .await;
        assert_eq!(batch, BATCH_FAILURE_MESSAGE);
        assert_ne!(online, batch);
    }

    #[tokio::test]
    async fn test_explain_timeout_uses_fallback() {
        let mock = MockBackend::new().with_delay(Duration::from_millis(200));
        let explainer =
            Explainer::with_embedded_prompts(Some(AIClient::Mock(mock)), Duration::from_millis(20))
                .unwrap();

        let result = explainer.explain(&request("X", "")).await;
        assert_eq!(result, Explanation::Failed);
    }

    #[tokio::test]
    async fn test_backend_healthy_respects_timeout() {
        let slow = MockBackend::new().with_delay(Duration::from_secs(30));
        let explainer =
            Explainer::with_embedded_prompts(Some(AIClient::Mock(slow)), Duration::from_millis(20))
                .unwrap();
        let started = std::time::Instant::now();
        assert!(!explainer.backend_healthy().await);
        assert!(started.elapsed() < Duration::from_secs(5));

        assert!(explainer_with_client(AIClient::mock()).backend_healthy().await);
        assert!(
            !explainer_with_client(AIClient::Mock(MockBackend::unhealthy()))
                .backend_healthy()
                .await
        );
        assert!(
            !Explainer::with_embedded_prompts(None, TIMEOUT)
                .unwrap()
                .backend_healthy()
                .await
        );
    }

    #[tokio::test]
    async fn test_explain_empty_completion_is_failure() {
        let mock = MockBackend::new().with_response("   \n");
        let result = explainer(&mock).explain(&request("X", "")).await;
        assert_eq!(result, Explanation::Failed);
    }

    #[tokio::test]
    async fn test_explain_without_backend() {
        let explainer = Explainer::with_embedded_prompts(None, TIMEOUT).unwrap();
        assert!(!explainer.is_available());

        let text = explainer
            .explain_text(&request("Akira", ""), Surface::Online)
            .await;
        assert_eq!(text, UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_batch_surface_trims() {
        let mock = MockBackend::new().with_response("  좋은 책입니다.\n\n");
        let explainer = explainer(&mock);

        let batch = explainer
            .explain_text(&request("X", ""), Surface::Batch)
            .await;
        assert_eq!(batch, "좋은 책입니다.");

        let online = explainer
            .explain_text(&request("X", ""), Surface::Online)
            .await;
        assert_eq!(online, "  좋은 책입니다.\n\n");
    }

    #[tokio::test]
    async fn test_ask_makes_two_calls() {
        let mock = MockBackend::new();
        let explainer = explainer(&mock);

        let answer = explainer.ask("Who wrote Watchmen?").await;
        assert!(answer.is_generated());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_ask_blank_question() {
        let mock = MockBackend::new();
        let answer = explainer(&mock).ask("   ").await;
        assert_eq!(answer, Explanation::MissingInput);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_failure() {
        let answer = explainer(&MockBackend::failing()).ask("hello").await;
        assert_eq!(answer.into_text(Surface::Online), ONLINE_FAILURE_MESSAGE);
    }
}
