//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Shelf - Browse a comic catalog one book at a time
#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Comic catalog browser with Korean AI explanations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.local/share/shelf/config/shelf.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog CSV or exported JSON (overrides config and SHELF_CATALOG)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the catalog CSV into a JSON artifact
    Convert {
        /// CSV to read (defaults to the configured catalog)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON file to write
        #[arg(short, long, default_value = "books.json")]
        output: PathBuf,

        /// Generate a Korean explanation for every book
        #[arg(long)]
        explain: bool,

        /// Explanations generated in parallel (with --explain)
        #[arg(long, default_value = "1")]
        concurrency: usize,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., frontend/)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Show one book from the catalog (indices wrap around, -1 is the last book)
    Show {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Generate a Korean explanation for a book
    Explain {
        /// Explain the catalog book at this index instead of the fields below
        #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["title", "original_title"])]
        index: Option<i64>,

        /// Title (usually the Korean edition title)
        #[arg(long)]
        title: Option<String>,

        /// Original title (preferred when present)
        #[arg(long)]
        original_title: Option<String>,

        /// Stock status text
        #[arg(long, default_value = "Unknown")]
        stock_status: String,

        /// Page-per-cost value score
        #[arg(long, default_value_t = 0.0)]
        page_per_cost: f64,

        /// Print the prompt instead of calling the model
        #[arg(long)]
        prompt_only: bool,
    },

    /// Ask a question and get the answer restated in Korean
    Ask {
        /// The question
        question: String,
    },

    /// Inspect prompt templates and overrides
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Test the configured AI backend
    AiTest {
        /// Use a different model for this run
        #[arg(long)]
        model: Option<String>,

        /// Send this raw prompt instead of a sample explanation
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts with their source and variables
    List,

    /// Print a prompt template
    Show {
        /// Prompt ID (e.g., explain_book, translate_korean)
        prompt_id: String,
    },

    /// Print the override directory
    Path,
}
