//! Integration tests for shelf-core
//!
//! These tests exercise the full CSV → catalog → explain → export workflow
//! through the public API only.

use std::sync::Arc;
use std::time::Duration;

use shelf_core::{
    explain::{BATCH_FAILURE_MESSAGE, MISSING_TITLE_MESSAGE, UNAVAILABLE_MESSAGE},
    export_catalog, AIClient, Catalog, Error, ExplainRequest, Explainer, ExportPipeline,
    MockBackend, Surface,
};

/// Catalog with one row per interesting shape:
/// separators in numbers, missing price, missing original title, and a row
/// with no usable title at all
fn catalog_csv() -> &'static str {
    "title,original_title,image_url,stock_status,price,page\n\
     왓치맨,Watchmen,https://img.example/1.jpg,in stock,\"35,000\",448\n\
     아키라,Akira,https://img.example/2.jpg,out of stock,\"10,000\",500\n\
     스폰,,https://img.example/3.jpg,preorder,,200\n\
     ,,,in stock,\"5,000\",100\n"
}

fn explainer(mock: &MockBackend) -> Explainer {
    Explainer::with_embedded_prompts(Some(AIClient::Mock(mock.clone())), Duration::from_secs(5))
        .expect("embedded prompts parse")
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_catalog_from_csv_wraps_around() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.csv");
    std::fs::write(&path, catalog_csv()).unwrap();

    let catalog = Catalog::load(&path).expect("catalog loads");
    assert_eq!(catalog.len(), 4);

    let akira = catalog.get(1).unwrap();
    assert_eq!(akira.original_title, "Akira");
    assert_eq!(akira.page_per_cost, 5.0);
    assert_eq!(akira.total, 4);

    // -1 is the last book, 5 wraps to the second
    assert_eq!(catalog.get(-1).unwrap().index, 3);
    assert_eq!(catalog.get(5).unwrap().index, 1);

    // No price → score 0
    assert_eq!(catalog.get(2).unwrap().page_per_cost, 0.0);
}

#[test]
fn test_empty_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "title,original_title,image_url,stock_status,price,page\n").unwrap();

    let catalog = Catalog::load(&path).unwrap();
    assert!(catalog.is_empty());
    assert!(matches!(catalog.get(0), Err(Error::EmptyCatalog)));
}

// =============================================================================
// Explain
// =============================================================================

#[tokio::test]
async fn test_explain_each_book() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.csv");
    std::fs::write(&path, catalog_csv()).unwrap();
    let catalog = Catalog::load(&path).unwrap();

    let mock = MockBackend::new();
    let explainer = explainer(&mock);

    let texts: Vec<String> = {
        let mut texts = Vec::new();
        for book in catalog.books() {
            let req = ExplainRequest::from_book(book);
            texts.push(explainer.explain_text(&req, Surface::Online).await);
        }
        texts
    };

    assert!(texts[0].contains("Watchmen"));
    assert!(texts[1].contains("Akira"));
    assert!(texts[2].contains("스폰"));
    assert_eq!(texts[3], MISSING_TITLE_MESSAGE);

    // The untitled book never reached the backend
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_explain_without_backend_is_unavailable() {
    let explainer = Explainer::with_embedded_prompts(None, Duration::from_secs(5)).unwrap();
    let req = ExplainRequest {
        title: Some("Akira".into()),
        ..ExplainRequest::default()
    };
    assert_eq!(
        explainer.explain_text(&req, Surface::Online).await,
        UNAVAILABLE_MESSAGE
    );
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_with_explanations_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("books.csv");
    let output = dir.path().join("books.json");
    std::fs::write(&input, catalog_csv()).unwrap();

    let mock = MockBackend::new();
    let pipeline = ExportPipeline::new(Arc::new(explainer(&mock))).with_concurrency(2);

    let mut last_progress = (0, 0);
    let stats = export_catalog(&input, &output, &pipeline, |done, total| {
        last_progress = (done, total)
    })
    .await
    .expect("export succeeds");

    assert_eq!(stats.books, 4);
    assert_eq!(stats.explained, 4);
    assert_eq!(last_progress, (4, 4));
    assert_eq!(mock.call_count(), 3);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 4);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record["index"], i);
        assert_eq!(record["total"], 4);
    }
    assert_eq!(records[3]["explanation"], MISSING_TITLE_MESSAGE);

    // The artifact is itself a loadable catalog that keeps explanations
    let catalog = Catalog::load(&output).unwrap();
    let watchmen = catalog.get(0).unwrap();
    assert!(watchmen.explanation.unwrap().contains("Watchmen"));
}

#[tokio::test]
async fn test_export_survives_backend_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("books.csv");
    let output = dir.path().join("out").join("books.json");
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&input, catalog_csv()).unwrap();

    let pipeline = ExportPipeline::new(Arc::new(explainer(&MockBackend::failing())));
    let stats = export_catalog(&input, &output, &pipeline, |_, _| {})
        .await
        .unwrap();
    assert_eq!(stats.books, 4);

    let catalog = Catalog::load(&output).unwrap();
    assert_eq!(
        catalog.get(0).unwrap().explanation.as_deref(),
        Some(BATCH_FAILURE_MESSAGE)
    );
}
