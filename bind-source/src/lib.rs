//! Configuration sources for confbind.
//!
//! A source is either the process environment (flat, string-valued) or a
//! YAML/JSON file parsed into a nested mapping.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod source;

pub use loader::{SourceLoader, parse};
pub use source::{ConfigSource, Format};
