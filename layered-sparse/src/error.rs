//! Error type for layered matrix construction and loading

use std::path::PathBuf;

use layered_core::LayeredError;
use thiserror::Error;

/// Errors raised while building, converting or reading layered matrices
#[derive(Debug, Error)]
pub enum Error {
    /// Value classification or structural failure from the core crate
    #[error(transparent)]
    Layered(#[from] LayeredError),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Malformed Matrix Market content, with the 1-based line number
    #[error("Matrix Market parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("expected a numeric field in the Matrix Market file, found '{0}'")]
    NonNumericField(String),

    #[error("unsupported Matrix Market layout on line {line}: {layout}")]
    Unsupported { line: usize, layout: String },

    /// A Matrix Market value that cannot be stored, with its 1-based line number
    #[error("invalid value on line {line}: {source}")]
    InvalidValue {
        line: usize,
        #[source]
        source: LayeredError,
    },

    /// A coordinate listed more than once, 1-based
    #[error("duplicate Matrix Market entry at row {row}, column {column}")]
    DuplicateEntry { row: usize, column: usize },

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: Option<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path, source }
    }

    pub(crate) fn unsupported(line: usize, layout: impl Into<String>) -> Self {
        Error::Unsupported {
            line,
            layout: layout.into(),
        }
    }

    /// Attach a line number to value errors raised while reading entries
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Error::Layered(source) => Error::InvalidValue { line, source },
            other => other,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type for layered matrix operations
pub type Result<T> = std::result::Result<T, Error>;
