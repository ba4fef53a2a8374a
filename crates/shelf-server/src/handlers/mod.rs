//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod books;
pub mod explain;
pub mod health;

// Re-export all handlers for use in router
pub use books::*;
pub use explain::*;
pub use health::*;
