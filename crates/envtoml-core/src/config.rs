//! Loading entry points
//!
//! A [`Loader`] parses a TOML document with its backend and then runs the
//! substitution walk over the result against its environment.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::backend::{FloatParser, TomlBackend, TomlCrateBackend};
use crate::environment::{Environment, ProcessEnv};
use crate::error::{Error, ErrorKind, Result};
use crate::value::Value;
use crate::walker::Walker;

/// Options for loading a document
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Parser for bare float literals, both in the document and in
    /// substituted text
    pub parse_float: FloatParser,
    /// Fail when a reference has no value and no default, instead of
    /// substituting an empty string
    pub fail_on_missing: bool,
}

impl LoadOptions {
    /// Default options: standard float parsing, missing variables become ""
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the float parser
    pub fn with_parse_float(mut self, parse_float: FloatParser) -> Self {
        self.parse_float = parse_float;
        self
    }

    /// Set whether missing variables are an error
    pub fn with_fail_on_missing(mut self, fail: bool) -> Self {
        self.fail_on_missing = fail;
        self
    }
}

/// Parses documents and applies environment substitution
#[derive(Clone)]
pub struct Loader {
    backend: Arc<dyn TomlBackend>,
    env: Arc<dyn Environment>,
    options: LoadOptions,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl Loader {
    /// Create a loader using the `toml` crate and the process environment
    pub fn new(options: LoadOptions) -> Self {
        Self {
            backend: Arc::new(TomlCrateBackend),
            env: Arc::new(ProcessEnv),
            options,
        }
    }

    /// Resolve references against a different environment
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Use a different TOML implementation
    pub fn with_backend(mut self, backend: impl TomlBackend + 'static) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    /// The options this loader applies
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a document from in-memory text
    pub fn loads(&self, text: &str) -> Result<Value> {
        let mut document = self
            .backend
            .parse_document(text, &self.options.parse_float)?;
        self.process(&mut document)?;
        Ok(document)
    }

    /// Load a document from a reader
    pub fn load<R: Read>(&self, mut reader: R) -> Result<Value> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.loads(&text)
    }

    /// Load a document from a file
    ///
    /// Syntax errors carry the file name alongside the line and column.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read file '{}': {}", file_name, e))
                .with_help("Check that the file exists and is readable UTF-8 text")
        })?;

        log::debug!("Loading {}", file_name);
        self.loads(&text).map_err(|e| match e.kind {
            ErrorKind::Parse => e.with_file(file_name),
            _ => e,
        })
    }

    /// Apply substitution to an already parsed tree, in place
    pub fn process(&self, value: &mut Value) -> Result<()> {
        Walker::new(self.backend.as_ref(), self.env.as_ref(), &self.options).process(value)
    }
}
