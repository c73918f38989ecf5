//! Configuration source descriptors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bind_primitives::{Error, Result};

/// File formats understood by the loader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// YAML documents.
    #[default]
    Yaml,
    /// JSON documents.
    Json,
}

impl Format {
    /// Infers the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(Error::UnsupportedFormat { format: s.into() })
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file-backed configuration source.
///
/// Relative paths are resolved against the loader's base directory, which is
/// the current working directory unless overridden.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigSource {
    filepath: PathBuf,
    format: Format,
}

impl ConfigSource {
    /// A source at `filepath`, parsed as YAML.
    #[must_use]
    pub fn file(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            format: Format::Yaml,
        }
    }

    /// A YAML source at `filepath`.
    #[must_use]
    pub fn yaml(filepath: impl Into<PathBuf>) -> Self {
        Self::file(filepath)
    }

    /// A JSON source at `filepath`.
    #[must_use]
    pub fn json(filepath: impl Into<PathBuf>) -> Self {
        Self::file(filepath).with_format(Format::Json)
    }

    /// A source whose format is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when the extension is not
    /// `.yaml`, `.yml` or `.json`.
    pub fn detect(filepath: impl Into<PathBuf>) -> Result<Self> {
        let filepath = filepath.into();
        let format = Format::from_path(&filepath)?;
        Ok(Self { filepath, format })
    }

    /// Overrides the parse format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Returns the configured path as given.
    #[must_use]
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Returns the parse format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.filepath.display(), self.format)
    }
}
