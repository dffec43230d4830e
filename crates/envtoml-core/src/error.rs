//! Error types for envtoml
//!
//! Errors are structured: a kind, the document path where the problem was
//! found, an optional source location, and an actionable help message.

use std::fmt;

/// Result type alias for envtoml operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for envtoml operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the document where the error occurred (e.g., "database.password")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl SourceLocation {
    /// Compute the 1-based line and column of a byte offset in `text`
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..floor_char_boundary(text, offset)];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self {
            file: None,
            line: Some(line),
            column: Some(column),
        }
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed TOML, reported by the format backend
    Parse,
    /// A referenced variable has no value and no default under `fail_on_missing`
    MissingVariable { var_name: String },
    /// Error accessing a path that doesn't exist
    PathNotFound,
    /// I/O error (file not found, unreadable stream)
    Io,
    /// Internal error (bug in envtoml)
    Internal,
}

impl Error {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create a missing variable error
    pub fn missing_variable(var_name: impl Into<String>, doc_path: Option<String>) -> Self {
        let var = var_name.into();
        Self {
            kind: ErrorKind::MissingVariable {
                var_name: var.clone(),
            },
            path: doc_path,
            source_location: None,
            help: Some(format!(
                "Set the {} environment variable or provide a default: ${{{}:-value}}",
                var, var
            )),
            cause: None,
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        let path_str = path.into();
        Self {
            kind: ErrorKind::PathNotFound,
            path: Some(path_str.clone()),
            source_location: None,
            help: Some(format!("Check that '{}' exists in the document", path_str)),
            cause: None,
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an internal error (bug in envtoml)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            path: None,
            source_location: None,
            help: Some("This is likely a bug in envtoml. Please report it.".into()),
            cause: Some(message.into()),
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Attach a file name, keeping any line/column already known
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        let file = Some(file.into());
        match &mut self.source_location {
            Some(loc) => loc.file = file,
            None => {
                self.source_location = Some(SourceLocation {
                    file,
                    line: None,
                    column: None,
                })
            }
        }
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Name of the missing variable, if this is a missing variable error
    pub fn missing_var_name(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::MissingVariable { var_name } => Some(var_name),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io(e.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::MissingVariable { var_name } => {
                write!(f, "Environment variable not set: {}", var_name)?
            }
            ErrorKind::PathNotFound => write!(f, "Path not found")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file.as_deref().unwrap_or("<input>"))?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
                if let Some(column) = loc.column {
                    write!(f, ":{}", column)?;
                }
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
