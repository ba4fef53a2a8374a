//! Batch export of the catalog to a JSON artifact
//!
//! The pipeline runs in two passes: every row is normalized and explained
//! first, then `total` is stamped on every record once the final count is
//! known. The artifact is written atomically (temp file in the destination
//! directory, then rename), so readers never see a partial catalog.
//!
//! The generation step is pluggable through [`ExplanationSource`]:
//! [`NoExplanations`] gives the fast export without any AI calls, and an
//! [`Explainer`] attaches a Korean explanation (or its batch fallback) to
//! every record.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::explain::{ExplainRequest, Explainer, Surface, BATCH_FAILURE_MESSAGE};
use crate::models::{BookRecord, ExportedBook};

/// Produces the explanation attached to an exported record
#[async_trait]
pub trait ExplanationSource: Send + Sync {
    /// Explanation for `book`, or None to leave the field out
    ///
    /// Implementations must not fail; a failed generation is expressed as
    /// fallback text.
    async fn explanation_for(&self, book: &BookRecord) -> Option<String>;

    /// Text stored when generating for a record aborted outright
    fn failure_text(&self) -> Option<String> {
        Some(BATCH_FAILURE_MESSAGE.to_string())
    }
}

/// Export without explanations
pub struct NoExplanations;

#[async_trait]
impl ExplanationSource for NoExplanations {
    async fn explanation_for(&self, _book: &BookRecord) -> Option<String> {
        None
    }

    fn failure_text(&self) -> Option<String> {
        None
    }
}

#[async_trait]
impl ExplanationSource for Explainer {
    async fn explanation_for(&self, book: &BookRecord) -> Option<String> {
        let request = ExplainRequest::from_book(book);
        Some(self.explain_text(&request, Surface::Batch).await)
    }
}

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub books: usize,
    pub explained: usize,
}

/// Normalized rows in, exported records out
pub struct ExportPipeline {
    source: Arc<dyn ExplanationSource>,
    concurrency: usize,
}

impl ExportPipeline {
    pub fn new(source: Arc<dyn ExplanationSource>) -> Self {
        Self {
            source,
            concurrency: 1,
        }
    }

    /// Pipeline that never calls a model
    pub fn without_explanations() -> Self {
        Self::new(Arc::new(NoExplanations))
    }

    /// Maximum number of explanations generated at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build exported records in source order
    ///
    /// `progress(done, total)` is called once per finished record. With
    /// concurrency above 1 records may finish out of order, but every record
    /// lands in its own slot so the output order always matches the input.
    pub async fn run<F>(&self, books: &[BookRecord], mut progress: F) -> Vec<ExportedBook>
    where
        F: FnMut(usize, usize),
    {
        let total = books.len();
        let mut slots: Vec<Option<String>> = vec![None; total];

        if self.concurrency <= 1 {
            for (i, book) in books.iter().enumerate() {
                slots[i] = self.source.explanation_for(book).await;
                progress(i + 1, total);
            }
        } else {
            let semaphore = Arc::new(Semaphore::new(self.concurrency));
            let mut tasks = JoinSet::new();

            for (i, book) in books.iter().enumerate() {
                let source = self.source.clone();
                let semaphore = semaphore.clone();
                let book = book.clone();
                tasks.spawn(async move {
                    // Held until the explanation is done
                    let _permit = semaphore.acquire_owned().await.ok();
                    (i, source.explanation_for(&book).await)
                });
            }

            let mut finished = vec![false; total];
            let mut done = 0;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((i, explanation)) => {
                        slots[i] = explanation;
                        finished[i] = true;
                    }
                    Err(e) => warn!(error = %e, "Explanation task failed"),
                }
                done += 1;
                progress(done, total);
            }

            // Aborted tasks never reported their index
            for (slot, _) in slots.iter_mut().zip(&finished).filter(|(_, ok)| !**ok) {
                *slot = self.source.failure_text();
            }
        }

        // Second pass: the final count is known only now
        books
            .iter()
            .zip(slots)
            .map(|(book, explanation)| ExportedBook {
                total,
                explanation,
                ..ExportedBook::from(book)
            })
            .collect()
    }
}

/// Write the exported catalog as a pretty-printed JSON array, atomically
pub fn write_catalog_json(path: &Path, books: &[ExportedBook]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, books)?;
    tmp.persist(path)
        .map_err(|e| Error::Export(format!("Failed to write {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), books = books.len(), "Wrote catalog JSON");
    Ok(())
}

/// Convert a catalog CSV (or a previous export) into a JSON artifact
pub async fn export_catalog<F>(
    input: &Path,
    output: &Path,
    pipeline: &ExportPipeline,
    progress: F,
) -> Result<ExportStats>
where
    F: FnMut(usize, usize),
{
    let catalog = Catalog::load(input)?;
    let exported = pipeline.run(catalog.books(), progress).await;
    write_catalog_json(output, &exported)?;

    let stats = ExportStats {
        books: exported.len(),
        explained: exported.iter().filter(|b| b.explanation.is_some()).count(),
    };
    info!(
        output = %output.display(),
        books = stats.books,
        explained = stats.explained,
        "Exported catalog"
    );
    Ok(stats)
}
