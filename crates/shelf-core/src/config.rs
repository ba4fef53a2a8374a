//! Application configuration
//!
//! Config is resolved in three layers:
//! 1. Embedded defaults (`config/shelf.toml`, compiled into binary)
//! 2. A TOML file: `--config <path>`, or ~/.local/share/shelf/config/shelf.toml
//! 3. Environment variables
//!
//! Environment variables:
//! - `SHELF_AI_BACKEND`: gemini (default), openai_compatible, ollama, mock, disabled
//! - `SHELF_AI_MODEL`: model override for any backend
//! - `SHELF_AI_TIMEOUT_SECS`: per-call timeout
//! - `SHELF_CATALOG`: catalog CSV or JSON path
//! - `SHELF_PROMPTS_DIR`: prompt override directory
//! - `GOOGLE_API_KEY`, `GEMINI_MODEL`, `GEMINI_HOST`: Gemini backend
//! - `OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`
//! - `OLLAMA_HOST`, `OLLAMA_MODEL`
//!
//! A missing credential is not an error: the AI client is simply not built and
//! explanation requests answer with the "unavailable" text.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::prompts::PromptLibrary;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/shelf.toml");

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shortest accepted backend timeout
pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Which text-completion backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Google generative-language API
    Gemini,
    /// Any server implementing `/v1/chat/completions`
    OpenAICompatible,
    Ollama,
    /// Deterministic canned responses
    Mock,
    /// Never call a model
    Disabled,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAICompatible => "openai_compatible",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
            Self::Disabled => "disabled",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAICompatible => "gpt-3.5-turbo",
            Self::Ollama => "llama3.2",
            Self::Mock | Self::Disabled => "mock",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenAICompatible)
            }
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text-completion backend settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: BackendKind,
    pub model: Option<String>,
    /// Base URL (required for openai_compatible and ollama, optional for gemini)
    pub host: Option<String>,
    /// Credential (required for gemini, optional for openai_compatible)
    pub api_key: Option<String>,
    /// Upper bound for each completion call
    pub timeout: Duration,
}

impl AiConfig {
    /// Embedded defaults plus environment variables
    pub fn from_env() -> Self {
        let mut config = AppConfig::embedded();
        config.apply_env();
        config.ai
    }

    /// Configured model, or the backend's default
    pub fn model_or_default(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            model: None,
            host: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Catalog source settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("updated_detailed_books2.csv"),
        }
    }
}

/// Prompt template settings
#[derive(Debug, Clone, Default)]
pub struct PromptsConfig {
    /// Override directory; None uses ~/.local/share/shelf/prompts/overrides
    pub override_dir: Option<PathBuf>,
}

impl PromptsConfig {
    /// Prompt library reading overrides from the configured directory
    pub fn library(&self) -> PromptLibrary {
        match &self.override_dir {
            Some(dir) => PromptLibrary::with_override_dir(dir.clone()),
            None => PromptLibrary::new(),
        }
    }
}

/// Complete application configuration, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub catalog: CatalogConfig,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Load config from file layers and apply environment overrides
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => fs::read_to_string(&default_path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let mut config = Self::from_toml(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Embedded defaults only (no file, no environment)
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Parse config from TOML content, on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(ai) = raw.ai {
            if let Some(backend) = ai.backend {
                config.ai.backend = backend.parse().map_err(Error::Config)?;
            }
            config.ai.model = ai.model.filter(|s| !s.is_empty());
            config.ai.host = ai.host.filter(|s| !s.is_empty());
            config.ai.api_key = ai.api_key.filter(|s| !s.is_empty());
            if let Some(secs) = ai.timeout_secs {
                config.ai.timeout = timeout_from_secs(secs, "timeout_secs");
            }
        }

        if let Some(path) = raw.catalog.and_then(|c| c.path) {
            config.catalog.path = path;
        }

        if let Some(dir) = raw.prompts.and_then(|p| p.override_dir) {
            config.prompts.override_dir = Some(dir);
        }

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup (empty values are ignored)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("SHELF_AI_BACKEND") {
            match backend.parse() {
                Ok(kind) => self.ai.backend = kind,
                Err(e) => warn!(error = %e, "Ignoring SHELF_AI_BACKEND"),
            }
        }

        if let Some(secs) = get("SHELF_AI_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.ai.timeout = timeout_from_secs(secs, "SHELF_AI_TIMEOUT_SECS"),
                Err(_) => warn!(value = %secs, "Ignoring invalid SHELF_AI_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = get("SHELF_CATALOG") {
            self.catalog.path = PathBuf::from(path);
        }

        if let Some(dir) = get("SHELF_PROMPTS_DIR") {
            self.prompts.override_dir = Some(PathBuf::from(dir));
        }

        let (host_key, model_key, key_key) = match self.ai.backend {
            BackendKind::Gemini => (Some("GEMINI_HOST"), Some("GEMINI_MODEL"), Some("GOOGLE_API_KEY")),
            BackendKind::OpenAICompatible => (
                Some("OPENAI_COMPATIBLE_HOST"),
                Some("OPENAI_COMPATIBLE_MODEL"),
                Some("OPENAI_COMPATIBLE_API_KEY"),
            ),
            BackendKind::Ollama => (Some("OLLAMA_HOST"), Some("OLLAMA_MODEL"), None),
            BackendKind::Mock | BackendKind::Disabled => (None, None, None),
        };

        if let Some(host) = host_key.and_then(&get) {
            self.ai.host = Some(host);
        }
        if let Some(model) = model_key.and_then(&get) {
            self.ai.model = Some(model);
        }
        if let Some(key) = key_key.and_then(&get) {
            self.ai.api_key = Some(key);
        }

        if let Some(model) = get("SHELF_AI_MODEL") {
            self.ai.model = Some(model);
        }
    }
}

/// Backend timeout from a seconds value, raised to [`MIN_TIMEOUT`]
///
/// A zero timeout would fail every call before it starts.
fn timeout_from_secs(secs: u64, source: &str) -> Duration {
    let timeout = Duration::from_secs(secs);
    if timeout < MIN_TIMEOUT {
        warn!(source, value = secs, "AI timeout below 1s, using 1s");
        return MIN_TIMEOUT;
    }
    timeout
}

/// Default config override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("shelf").join("config").join("shelf.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    ai: Option<RawAi>,
    catalog: Option<RawCatalog>,
    prompts: Option<RawPrompts>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    backend: Option<String>,
    model: Option<String>,
    host: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawPrompts {
    override_dir: Option<PathBuf>,
}
