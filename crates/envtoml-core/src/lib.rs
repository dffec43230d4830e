//! envtoml-core: TOML loading with environment variable interpolation
//!
//! Parses a TOML document, substitutes `$VAR`, `${VAR}` and
//! `${VAR:-default}` references in its string values from the environment
//! (`$$` is a literal `$`), and re-reads each substituted string as a TOML
//! literal so numbers, booleans, dates and inline tables get their natural
//! type.
//!
//! # Example
//!
//! ```rust
//! use envtoml_core::{loads, LoadOptions, Value};
//!
//! std::env::set_var("ENVTOML_DOC_PORT", "5432");
//!
//! let doc = loads(
//!     r#"
//! [database]
//! host = "${ENVTOML_DOC_HOST:-localhost}"
//! port = "$ENVTOML_DOC_PORT"
//! "#,
//!     &LoadOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(doc.get_path("database.host").unwrap().as_str(), Some("localhost"));
//! assert_eq!(doc.get_path("database.port").unwrap(), &Value::Integer(5432));
//! ```

pub mod backend;
pub mod environment;
pub mod error;
pub mod interpolation;
pub mod value;
pub mod walker;

mod config;

use std::io::Read;

pub use backend::{FloatParser, TomlBackend, TomlCrateBackend};
pub use config::{LoadOptions, Loader};
pub use environment::{Environment, MapEnv, ProcessEnv};
pub use error::{Error, ErrorKind, Result};
pub use value::Value;

/// Load a document from a reader, substituting from the process environment
pub fn load<R: Read>(reader: R, options: &LoadOptions) -> Result<Value> {
    Loader::new(options.clone()).load(reader)
}

/// Load a document from text, substituting from the process environment
pub fn loads(text: &str, options: &LoadOptions) -> Result<Value> {
    Loader::new(options.clone()).loads(text)
}
