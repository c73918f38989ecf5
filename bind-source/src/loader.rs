//! Reads configuration sources into [`DataSource`] values.

use std::fs;
use std::path::{Path, PathBuf};

use bind_primitives::{DataSource, Error, LoadError, Result, Value};
use tracing::debug;

use crate::source::{ConfigSource, Format};

/// Loads data sources from files or the process environment.
#[derive(Clone, Debug, Default)]
pub struct SourceLoader {
    base_dir: Option<PathBuf>,
}

impl SourceLoader {
    /// Creates a loader that resolves relative paths against the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir` instead of the working directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Loads `source`, or snapshots the process environment when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] when the file cannot be read, fails to parse,
    /// or does not hold a mapping at its top level.
    pub fn load(&self, source: Option<&ConfigSource>) -> Result<DataSource> {
        match source {
            Some(source) => self.load_file(source),
            None => Ok(Self::environment()),
        }
    }

    /// Reads and parses a file source.
    ///
    /// # Errors
    ///
    /// See [`SourceLoader::load`].
    pub fn load_file(&self, source: &ConfigSource) -> Result<DataSource> {
        let path = self.resolve_path(source.filepath())?;
        debug!(path = %path.display(), format = %source.format(), "loading configuration file");

        let content = fs::read_to_string(&path).map_err(|err| Error::Load {
            path: path.clone(),
            source: err.into(),
        })?;

        parse(&content, source.format()).map_err(|source| Error::Load { path, source })
    }

    /// Snapshots the process environment as a flat, string-valued source.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn environment() -> DataSource {
        DataSource::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    fn resolve_path(&self, filepath: &Path) -> Result<PathBuf> {
        if filepath.is_absolute() {
            return Ok(filepath.to_path_buf());
        }
        let base = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|err| Error::Load {
                path: filepath.to_path_buf(),
                source: err.into(),
            })?,
        };
        Ok(base.join(filepath))
    }
}

/// Parses document text in the given format.
///
/// # Errors
///
/// Returns the parser error, or [`LoadError::NotAMapping`] when the document
/// is neither a mapping nor empty.
pub fn parse(content: &str, format: Format) -> std::result::Result<DataSource, LoadError> {
    let value: Value = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };

    match value {
        Value::Object(map) => Ok(map.into()),
        Value::Null => Ok(DataSource::new()),
        _ => Err(LoadError::NotAMapping),
    }
}
