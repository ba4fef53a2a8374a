//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config, catalog, explainer construction)
//! - `convert` - CSV to JSON catalog export
//! - `books` - Catalog lookup, explanations and questions
//! - `ai` - Backend connectivity test
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command

pub mod ai;
pub mod books;
pub mod convert;
pub mod core;
pub mod prompts;
pub mod serve;

// Re-export command functions for main.rs
pub use ai::*;
pub use books::*;
pub use convert::*;
pub use core::*;
pub use prompts::*;
pub use serve::*;

/// Truncate a string for table display
///
/// Counts chars, not bytes: titles and explanations are mostly Korean.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
