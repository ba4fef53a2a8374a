//! Catalog conversion command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use shelf_core::export_catalog;
use shelf_core::{AppConfig, ExportPipeline};
use tracing::warn;

use super::build_explainer;

/// Convert the catalog CSV to a JSON artifact, optionally with explanations
pub async fn cmd_convert(
    config: &AppConfig,
    input: Option<&Path>,
    output: &Path,
    explain: bool,
    concurrency: usize,
) -> Result<()> {
    let input = input.unwrap_or(config.catalog.path.as_path());

    println!("📚 Converting {} → {}", input.display(), output.display());

    let pipeline = if explain {
        let explainer = build_explainer(config)?;
        if explainer.is_available() {
            println!("   Generating explanations (concurrency {})", concurrency.max(1));
            ExportPipeline::new(Arc::new(explainer)).with_concurrency(concurrency)
        } else {
            warn!("No AI backend configured, skipping explanation generation");
            ExportPipeline::without_explanations()
        }
    } else {
        ExportPipeline::without_explanations()
    };

    let stats = export_catalog(input, output, &pipeline, |done, total| {
        if explain {
            println!("   [{}/{}]", done, total);
        }
    })
    .await
    .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!(
        "✅ Successfully converted {} books to {}",
        stats.books,
        output.display()
    );
    if stats.explained > 0 {
        println!("   {} with explanations", stats.explained);
    }

    Ok(())
}
