//! Catalog lookup, explanation and question commands

use anyhow::{bail, Result};
use shelf_core::{AppConfig, ExplainRequest, Surface};

use super::{build_explainer, open_catalog};

/// Where the book to explain comes from
pub enum ExplainSource {
    /// A catalog entry (wraparound index)
    Catalog(i64),
    /// Fields given on the command line
    Fields {
        title: Option<String>,
        original_title: Option<String>,
        stock_status: String,
        page_per_cost: f64,
    },
}

/// Print one book as pretty JSON
pub fn cmd_show(config: &AppConfig, index: i64) -> Result<()> {
    let catalog = open_catalog(config)?;
    let book = catalog.get(index)?;
    println!("{}", serde_json::to_string_pretty(&book)?);
    Ok(())
}

/// Generate (or preview the prompt for) one explanation
pub async fn cmd_explain(config: &AppConfig, source: ExplainSource, prompt_only: bool) -> Result<()> {
    println!("{}", explain_text(config, source, prompt_only).await?);
    Ok(())
}

/// Text `explain` prints: the explanation, or the prompt with `prompt_only`
pub async fn explain_text(config: &AppConfig, source: ExplainSource, prompt_only: bool) -> Result<String> {
    let request = match source {
        ExplainSource::Catalog(index) => {
            let catalog = open_catalog(config)?;
            let effective = catalog.effective_index(index)?;
            ExplainRequest::from_book(&catalog.books()[effective])
        }
        ExplainSource::Fields {
            title,
            original_title,
            stock_status,
            page_per_cost,
        } => ExplainRequest {
            title,
            original_title,
            stock_status,
            page_per_cost,
        },
    };

    let explainer = build_explainer(config)?;

    if prompt_only {
        return match explainer.prompt_for(&request) {
            Some(prompt) => Ok(prompt),
            None => bail!("A title or original title is required"),
        };
    }

    Ok(explainer.explain_text(&request, Surface::Online).await)
}

/// Answer a question in Korean
pub async fn cmd_ask(config: &AppConfig, question: &str) -> Result<()> {
    println!("{}", ask_text(config, question).await?);
    Ok(())
}

/// Text `ask` prints
pub async fn ask_text(config: &AppConfig, question: &str) -> Result<String> {
    let explainer = build_explainer(config)?;
    Ok(explainer.ask(question).await.into_text(Surface::Online))
}
