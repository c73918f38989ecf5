//! Shared error definitions for configuration binding.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the binding pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading sources or resolving configuration values.
#[derive(Debug, Error)]
pub enum Error {
    /// The value is absent, has no default, and is marked required.
    #[error("{key} is required")]
    RequiredValue {
        /// Source key that had no value.
        key: String,
    },

    /// Coercion failed or the validator rejected the value.
    #[error("value '{value}' is invalid for {key}{}", reason_suffix(.reason.as_deref()))]
    InvalidValue {
        /// Source key of the offending value.
        key: String,
        /// Raw value as read from the source.
        value: String,
        /// Reason supplied by the validator or coercion, when available.
        reason: Option<String>,
    },

    /// A user transformer failed on the raw value.
    #[error("failed to transform {key}: {reason}")]
    TransformFailed {
        /// Source key of the offending value.
        key: String,
        /// Message returned by the transformer.
        reason: String,
    },

    /// The source loader was asked for a format it does not parse.
    #[error("unsupported data format: {format}")]
    UnsupportedFormat {
        /// The requested format name.
        format: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        /// Absolute path of the file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: LoadError,
    },

    /// A resolved instance could not be turned into the target type.
    #[error("failed to materialize {type_name}: {source}")]
    Materialize {
        /// Name of the target type.
        type_name: &'static str,
        /// Deserialization error from serde.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Creates a [`Error::RequiredValue`] for the given key.
    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self::RequiredValue { key: key.into() }
    }

    /// Creates a [`Error::InvalidValue`] for the given key and raw value.
    #[must_use]
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: Option<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason,
        }
    }

    /// Creates a [`Error::TransformFailed`] for the given key.
    #[must_use]
    pub fn transform(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransformFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the source key for resolution errors.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::RequiredValue { key }
            | Self::InvalidValue { key, .. }
            | Self::TransformFailed { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns the validator or coercion reason carried by [`Error::InvalidValue`].
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { reason, .. } => reason.as_deref(),
            Self::TransformFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Failures raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// The file is not valid YAML.
    #[error("yaml error: {source}")]
    Yaml {
        /// Source [`serde_yaml::Error`].
        #[from]
        source: serde_yaml::Error,
    },
    /// The file is not valid JSON.
    #[error("json error: {source}")]
    Json {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// The document parsed but its top level is not a mapping.
    #[error("top-level document must be a mapping")]
    NotAMapping,
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(", reason: {r}")).unwrap_or_default()
}
