//! Error types for smack-rules.

use std::path::{Path, PathBuf};

/// Errors that can occur while building, loading, or saving rules.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without
/// breaking callers that match on it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A label is longer than the Smack maximum.
    #[error("Label too long: '{label}' exceeds {max} characters")]
    LabelTooLong {
        /// The rejected label
        label: String,
        /// The maximum accepted length
        max: usize,
    },

    /// A label was rejected by a label validator, contains NUL, or cannot be
    /// written as a single rule file field.
    #[error("Invalid label: '{label}'")]
    InvalidLabel {
        /// The rejected label
        label: String,
    },

    /// A rule file line did not split into exactly three fields.
    #[error("Malformed rule at line {line}: '{content}'")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// The offending line, without its terminator
        content: String,
    },

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a named file.
    #[error("I/O error on {}: {source}", path.display())]
    IoWithPath {
        /// File the operation was performed on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A rule file format name was not recognised.
    #[error("Unknown rule format '{name}' (expected 'default' or 'kernel')")]
    UnknownFormat {
        /// The rejected name
        name: String,
    },
}

/// Convenience `Result` type alias for rule operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a malformed-line error.
    pub fn malformed_line<S: Into<String>>(line: usize, content: S) -> Self {
        Error::MalformedLine {
            line,
            content: content.into(),
        }
    }

    /// Creates a label-too-long error.
    pub fn label_too_long<S: Into<String>>(label: S, max: usize) -> Self {
        Error::LabelTooLong {
            label: label.into(),
            max,
        }
    }

    /// Returns whether this error comes from rejected input rather than
    /// from the environment.
    ///
    /// Parse errors will fail again on retry with the same input; I/O
    /// errors may not.
    pub fn is_parse_error(&self) -> bool {
        match self {
            Error::LabelTooLong { .. } => true,
            Error::InvalidLabel { .. } => true,
            Error::MalformedLine { .. } => true,
            Error::Io(_) => false,
            Error::IoWithPath { .. } => false,
            Error::UnknownFormat { .. } => true,
        }
    }

    /// Returns the underlying I/O error, if any.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Io(e) => Some(e),
            Error::IoWithPath { source, .. } => Some(source),
            _ => None,
        }
    }
}
