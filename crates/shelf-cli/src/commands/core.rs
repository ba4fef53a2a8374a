//! Shared utilities for commands
//!
//! Every command works from one `AppConfig`, resolved once in `main`.

use std::path::Path;

use anyhow::{Context, Result};
use shelf_core::{AIClient, AppConfig, Catalog, Explainer};

/// Resolve config from file and environment, then apply the `--catalog` flag
pub fn load_config(config_path: Option<&Path>, catalog: Option<&Path>) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path).context("Failed to load config")?;
    if let Some(path) = catalog {
        config.catalog.path = path.to_path_buf();
    }
    Ok(config)
}

/// Load the configured catalog (CSV or exported JSON)
pub fn open_catalog(config: &AppConfig) -> Result<Catalog> {
    Catalog::load(&config.catalog.path).with_context(|| {
        format!(
            "Failed to load catalog from {}",
            config.catalog.path.display()
        )
    })
}

/// Build the explanation generator for the configured backend
///
/// A missing credential is not an error; the explainer simply reports itself
/// unavailable.
pub fn build_explainer(config: &AppConfig) -> Result<Explainer> {
    let client = AIClient::from_config(&config.ai);
    Explainer::new(client, &mut config.prompts.library(), config.ai.timeout)
        .context("Failed to load prompt templates")
}
