//! Bind typed configuration from environment variables and YAML/JSON files.
//!
//! This crate bundles the workspace crates behind feature flags. The most
//! common types are re-exported at the top level.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use bind_primitives as primitives;

/// Source loading (enabled by `source` feature).
#[cfg(feature = "source")]
pub use bind_source as source;

/// Descriptors, registry, resolver and binder (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use bind_kernel as kernel;

pub use bind_primitives::{DataSource, Error, LoadError, Result, Value};

#[cfg(feature = "source")]
pub use bind_source::{ConfigSource, Format, SourceLoader};

#[cfg(feature = "kernel")]
pub use bind_kernel::{
    BindOptions, BindSources, Binder, ConfigType, Configuration, FieldDescriptor, FieldDoc,
    FieldRegistry, FieldSet, FieldType, ResolvedInstance, ResolvedValue, ValidationStage,
};
