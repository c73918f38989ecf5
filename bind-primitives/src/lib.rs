//! Core shared types for confbind.

#![warn(missing_docs, clippy::pedantic)]

mod data;
mod error;

/// Key-value data sources and raw value helpers.
pub use data::{DataSource, render_raw};
/// Error type and result alias shared across the workspace.
pub use error::{Error, LoadError, Result};
/// Untyped value model shared by sources and resolved instances.
pub use serde_json::{Map, Value};
