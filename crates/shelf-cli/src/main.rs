//! Shelf CLI - Comic catalog browser
//!
//! Usage:
//!   shelf convert --explain        Convert the catalog CSV to books.json
//!   shelf serve --port 8000        Start web server
//!   shelf show -1                  Show the last book
//!   shelf explain --title Akira    Generate a Korean explanation

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.catalog.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            explain,
            concurrency,
        } => commands::cmd_convert(&config, input.as_deref(), &output, explain, concurrency).await,
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(&config, &host, port, static_dir.as_deref(), allowed_origins)
                .await
        }
        Commands::Show { index } => commands::cmd_show(&config, index),
        Commands::Explain {
            index,
            title,
            original_title,
            stock_status,
            page_per_cost,
            prompt_only,
        } => {
            let source = match index {
                Some(index) => commands::ExplainSource::Catalog(index),
                None => commands::ExplainSource::Fields {
                    title,
                    original_title,
                    stock_status,
                    page_per_cost,
                },
            };
            commands::cmd_explain(&config, source, prompt_only).await
        }
        Commands::Ask { question } => commands::cmd_ask(&config, &question).await,
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(&config),
            Some(PromptsAction::Show { prompt_id }) => {
                commands::cmd_prompts_show(&config, &prompt_id)
            }
            Some(PromptsAction::Path) => commands::cmd_prompts_path(&config),
        },
        Commands::AiTest { model, prompt } => {
            commands::cmd_ai_test(&config, model.as_deref(), prompt.as_deref()).await
        }
    }
}
