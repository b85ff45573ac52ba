//! Global error handling for local-gitingest
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for local-gitingest operations
#[derive(Error, Debug)]
pub enum IngestError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Errors raised while walking the directory tree
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file could not be created or written
    #[error("Failed to write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not run from inside a git working tree
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for local-gitingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Creates an IngestError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::IngestError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            IngestError::Unexpected(format!("{}: {}", context, e))
        })
    }
}

impl IngestError {
    /// Whether the error came from the filesystem while scanning
    ///
    /// Only these errors may be downgraded by `ErrorPolicy::SkipUnreadable`.
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Walk(_) | Self::Read { .. })
    }
}

// Allow converting IngestError to io::Error for io::Result based callers
impl From<IngestError> for io::Error {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
