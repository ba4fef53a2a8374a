//! Shelf Core Library
//!
//! Shared functionality for the Shelf comic catalog browser:
//! - CSV import with a derived page-per-cost value score
//! - Read-only catalog with wraparound indexing
//! - Prompt library for the Korean explanation prompts
//! - Pluggable text-completion backends (Gemini, OpenAI-compatible, Ollama)
//! - Explanation generator with fixed fallbacks
//! - Batch export to a JSON catalog artifact

pub mod ai;
pub mod catalog;
pub mod config;
pub mod error;
pub mod explain;
pub mod export;
pub mod import;
pub mod models;
pub mod prompts;

/// Test utilities including a mock generative-language server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, GeminiBackend, MockBackend, OllamaBackend, OpenAICompatibleBackend,
};
pub use catalog::Catalog;
pub use config::{AiConfig, AppConfig, BackendKind, CatalogConfig, PromptsConfig};
pub use error::{Error, Result};
pub use explain::{build_prompt, ExplainRequest, Explainer, Explanation, Surface};
pub use export::{
    export_catalog, write_catalog_json, ExplanationSource, ExportPipeline, ExportStats,
    NoExplanations,
};
pub use models::{BookRecord, BookView, ExportedBook, StockStatus};
pub use prompts::{Prompt, PromptId, PromptLibrary};
