//! Server command implementation

use std::path::Path;

use anyhow::Result;
use shelf_core::{AppConfig, Catalog};
use shelf_server::ServerConfig;
use tracing::error;

use super::{build_explainer, open_catalog};

pub async fn cmd_serve(
    config: &AppConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting Shelf web server...");
    println!("   Catalog: {}", config.catalog.path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }

    // A broken catalog still serves the frontend; book lookups answer 503
    let catalog = match open_catalog(config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{:#}", e);
            Catalog::default()
        }
    };
    println!("   Books: {}", catalog.len());

    let explainer = build_explainer(config)?;
    let static_dir = static_dir.and_then(|d| d.to_str());

    shelf_server::serve(
        catalog,
        explainer,
        host,
        port,
        static_dir,
        ServerConfig { allowed_origins },
    )
    .await
}
