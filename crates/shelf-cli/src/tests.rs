//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use clap::Parser;
use shelf_core::explain::MISSING_TITLE_MESSAGE;
use shelf_core::{AppConfig, BackendKind, Catalog};
use tempfile::TempDir;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate, AiTestOutcome, ExplainSource};

const CSV: &str = "title,original_title,image_url,stock_status,price,page\n\
                   왓치맨,Watchmen,https://img.example/1.jpg,in stock,\"35,000\",448\n\
                   아키라,Akira,https://img.example/2.jpg,out of stock,\"10,000\",500\n";

/// Temp dir with a catalog CSV, and a config using the mock backend
///
/// Prompt overrides are read from `<tmp>/prompts`, never the user's directory.
fn setup() -> (TempDir, AppConfig) {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("books.csv");
    std::fs::write(&csv_path, CSV).unwrap();

    let mut config = AppConfig::default();
    config.ai.backend = BackendKind::Mock;
    config.catalog.path = csv_path;
    config.prompts.override_dir = Some(dir.path().join("prompts"));
    (dir, config)
}

fn fields(title: Option<&str>) -> ExplainSource {
    ExplainSource::Fields {
        title: title.map(String::from),
        original_title: None,
        stock_status: "Unknown".into(),
        page_per_cost: 0.0,
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_show_negative_index() {
    let cli = Cli::try_parse_from(["shelf", "show", "-1"]).unwrap();
    assert!(matches!(cli.command, Commands::Show { index: -1 }));
}

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["shelf", "serve"]).unwrap();
    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            assert_eq!(port, 8000);
            assert_eq!(host, "127.0.0.1");
            assert!(static_dir.is_none());
            assert!(allowed_origins.is_empty());
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["shelf", "show", "3", "--catalog", "books.json", "-v"]).unwrap();
    assert_eq!(cli.catalog, Some(PathBuf::from("books.json")));
    assert!(cli.verbose);
}

#[test]
fn test_parse_explain_index_conflicts_with_title() {
    assert!(Cli::try_parse_from(["shelf", "explain", "--index", "1", "--title", "Akira"]).is_err());
    assert!(Cli::try_parse_from(["shelf", "explain", "--index", "-2"]).is_ok());
}

#[test]
fn test_parse_convert() {
    let cli = Cli::try_parse_from(["shelf", "convert", "--explain", "--concurrency", "4"]).unwrap();
    match cli.command {
        Commands::Convert {
            input,
            output,
            explain,
            concurrency,
        } => {
            assert!(input.is_none());
            assert_eq!(output, PathBuf::from("books.json"));
            assert!(explain);
            assert_eq!(concurrency, 4);
        }
        _ => panic!("expected convert"),
    }
}

// ========== Config Tests ==========

#[test]
fn test_load_config_catalog_flag_wins() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("shelf.toml");
    std::fs::write(&config_path, "[catalog]\npath = \"from-file.csv\"\n").unwrap();

    let config = commands::load_config(Some(&config_path), None).unwrap();
    // SHELF_CATALOG may be set in the environment running the tests
    if std::env::var("SHELF_CATALOG").is_err() {
        assert_eq!(config.catalog.path, PathBuf::from("from-file.csv"));
    }

    let config =
        commands::load_config(Some(&config_path), Some(Path::new("flag.json"))).unwrap();
    assert_eq!(config.catalog.path, PathBuf::from("flag.json"));
}

#[test]
fn test_load_config_missing_file() {
    assert!(commands::load_config(Some(Path::new("/nonexistent/shelf.toml")), None).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_cmd_show() {
    let (_dir, config) = setup();
    assert!(commands::cmd_show(&config, 0).is_ok());
    assert!(commands::cmd_show(&config, -1).is_ok());
    assert!(commands::cmd_show(&config, 1_000_000).is_ok());
}

#[test]
fn test_cmd_show_missing_catalog() {
    let (_dir, mut config) = setup();
    config.catalog.path = PathBuf::from("/nonexistent/books.csv");
    let err = commands::cmd_show(&config, 0).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load catalog"));
}

#[test]
fn test_cmd_show_empty_catalog() {
    let (dir, mut config) = setup();
    let empty = dir.path().join("empty.csv");
    std::fs::write(&empty, "title,original_title,image_url,stock_status,price,page\n").unwrap();
    config.catalog.path = empty;

    let err = commands::cmd_show(&config, 0).unwrap_err();
    assert!(err.to_string().contains("No data loaded"));
}

#[tokio::test]
async fn test_cmd_convert_without_explanations() {
    let (dir, config) = setup();
    let output = dir.path().join("books.json");

    commands::cmd_convert(&config, None, &output, false, 1)
        .await
        .unwrap();

    let catalog = Catalog::load(&output).unwrap();
    assert_eq!(catalog.len(), 2);
    let akira = catalog.get(1).unwrap();
    assert_eq!(akira.total, 2);
    assert_eq!(akira.page_per_cost, 5.0);
    assert!(akira.explanation.is_none());
}

#[tokio::test]
async fn test_cmd_convert_with_mock_explanations() {
    let (dir, config) = setup();
    let output = dir.path().join("out.json");

    commands::cmd_convert(&config, Some(&config.catalog.path), &output, true, 2)
        .await
        .unwrap();

    let catalog = Catalog::load(&output).unwrap();
    assert!(catalog.get(0).unwrap().explanation.unwrap().contains("Watchmen"));
    assert!(catalog.get(1).unwrap().explanation.unwrap().contains("Akira"));
}

#[tokio::test]
async fn test_cmd_convert_explain_without_backend_skips_generation() {
    let (dir, mut config) = setup();
    config.ai.backend = BackendKind::Disabled;
    let output = dir.path().join("books.json");

    commands::cmd_convert(&config, None, &output, true, 1)
        .await
        .unwrap();

    let catalog = Catalog::load(&output).unwrap();
    assert!(catalog.get(0).unwrap().explanation.is_none());
}

#[tokio::test]
async fn test_cmd_convert_missing_input() {
    let (dir, config) = setup();
    let result = commands::cmd_convert(
        &config,
        Some(&dir.path().join("missing.csv")),
        &dir.path().join("out.json"),
        false,
        1,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_explain_text() {
    let (_dir, config) = setup();

    let text = commands::explain_text(&config, fields(Some("Akira")), false)
        .await
        .unwrap();
    assert_eq!(text, "[mock] Explain the comic book 'Akira' briefly in Korean.");

    // Wraps to the last catalog entry, which is queried by its original title
    let text = commands::explain_text(&config, ExplainSource::Catalog(-1), false)
        .await
        .unwrap();
    assert!(text.contains("'Akira'"), "got: {}", text);

    // Missing title prints the placeholder, not an error
    let text = commands::explain_text(&config, fields(None), false)
        .await
        .unwrap();
    assert_eq!(text, MISSING_TITLE_MESSAGE);

    assert!(commands::cmd_explain(&config, ExplainSource::Catalog(0), false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_explain_text_prompt_only() {
    let (_dir, mut config) = setup();
    // No backend needed to preview a prompt
    config.ai.backend = BackendKind::Disabled;

    let prompt = commands::explain_text(&config, fields(Some("Akira")), true)
        .await
        .unwrap();
    assert!(prompt.starts_with("Explain the comic book 'Akira' briefly in Korean."));
    assert!(prompt.contains("The page per cost value is: 0.00"));
    assert!(!prompt.contains("{{"));

    let err = commands::explain_text(&config, fields(None), true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("title"));
}

#[tokio::test]
async fn test_explain_text_uses_prompt_override() {
    let (dir, config) = setup();
    let prompts_dir = dir.path().join("prompts");
    std::fs::create_dir_all(&prompts_dir).unwrap();
    std::fs::write(
        prompts_dir.join("explain_book.md"),
        "---\nid: explain_book\nversion: 2\n---\n\nIntroduce {{title}} ({{stock_status}})\n",
    )
    .unwrap();

    let prompt = commands::explain_text(&config, fields(Some("Akira")), true)
        .await
        .unwrap();
    assert_eq!(prompt.trim(), "Introduce Akira (Unknown)");
}

#[tokio::test]
async fn test_ask_text() {
    let (_dir, config) = setup();

    // The mock echoes the first prompt line; the translation pass starts with
    // the first answer
    let text = commands::ask_text(&config, "Who wrote Watchmen?").await.unwrap();
    assert_eq!(text, "[mock] [mock] Who wrote Watchmen?");
    assert!(commands::cmd_ask(&config, "Who wrote Watchmen?").await.is_ok());

    let text = commands::ask_text(&config, "   ").await.unwrap();
    assert_eq!(text, MISSING_TITLE_MESSAGE);
}

#[tokio::test]
async fn test_run_ai_test_mock() {
    let (_dir, config) = setup();

    match commands::run_ai_test(&config, None, None).await.unwrap() {
        AiTestOutcome::Responded { text, .. } => {
            assert_eq!(text, "[mock] Explain the comic book 'Watchmen' briefly in Korean.");
        }
        other => panic!("expected a response, got {:?}", other),
    }

    match commands::run_ai_test(&config, Some("other"), Some("hello")).await.unwrap() {
        AiTestOutcome::Responded { text, .. } => assert_eq!(text, "[mock] hello"),
        other => panic!("expected a response, got {:?}", other),
    }

    assert!(commands::cmd_ai_test(&config, None, None).await.is_ok());
}

#[tokio::test]
async fn test_run_ai_test_unconfigured() {
    let (_dir, mut config) = setup();
    config.ai.backend = BackendKind::Disabled;

    let outcome = commands::run_ai_test(&config, None, None).await.unwrap();
    assert_eq!(outcome, AiTestOutcome::NotConfigured);
    assert!(commands::cmd_ai_test(&config, None, None).await.is_ok());
}

#[test]
fn test_describe_prompt() {
    let (_dir, config) = setup();

    let text = commands::describe_prompt(&config, "explain_book").unwrap();
    assert!(text.starts_with("# explain_book v1\n"));
    assert!(text.contains("# embedded default\n"));
    assert!(text.contains("# variables: title, stock_status, page_per_cost\n"));
    assert!(text.contains("# flags: out_of_stock, in_stock, other_stock, good_value, pricey\n"));

    let text = commands::describe_prompt(&config, "translate_korean").unwrap();
    assert!(text.contains("# variables: text\n"));
    assert!(!text.contains("# flags:"));

    let err = commands::describe_prompt(&config, "nope").unwrap_err();
    assert!(err.to_string().contains("explain_book, translate_korean"));
}

#[test]
fn test_describe_prompt_override() {
    let (dir, config) = setup();
    let prompts_dir = dir.path().join("prompts");
    std::fs::create_dir_all(&prompts_dir).unwrap();
    let path = prompts_dir.join("translate_korean.md");
    std::fs::write(&path, "---\nid: translate_korean\nversion: 3\n---\n\n{{text}} in Korean\n").unwrap();

    let text = commands::describe_prompt(&config, "translate_korean").unwrap();
    assert!(text.starts_with("# translate_korean v3\n"));
    assert!(text.contains(&format!("# override: {}", path.display())));

    assert!(commands::cmd_prompts_list(&config).is_ok());
    assert!(commands::cmd_prompts_show(&config, "translate_korean").is_ok());
    assert!(commands::cmd_prompts_path(&config).is_ok());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is too long", 8), "this is…");
    // Multi-byte characters are never split
    assert_eq!(truncate("왓치맨 디럭스 에디션", 4), "왓치맨…");
}
