//! Error types for pdfsift.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pdfsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while processing a batch.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a valid or parseable PDF.
    #[error("Unreadable PDF: {0}")]
    UnreadablePdf(String),

    /// The PDF content is encrypted and cannot be accessed.
    #[error("Document is encrypted")]
    EncryptedPdf,

    /// An output artifact could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A heuristic rule failed internally.
    #[error("Rule '{rule}' failed: {message}")]
    RuleExecution { rule: &'static str, message: String },

    /// The input directory is missing or not a directory.
    #[error("Input directory {} is not accessible: {reason}", path.display())]
    InputDir { path: PathBuf, reason: String },

    /// The output directory could not be created.
    #[error("Output directory {} could not be created: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rule pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Build a [`Error::Write`] for the given path.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// Classify this error for the batch report.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnreadablePdf(_) => ErrorKind::UnreadablePdf,
            Error::EncryptedPdf => ErrorKind::EncryptedPdf,
            Error::Write { .. } | Error::Serialize(_) => ErrorKind::WriteError,
            Error::RuleExecution { .. } => ErrorKind::RuleExecutionError,
            _ => ErrorKind::Other,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => Error::EncryptedPdf,
            _ => Error::UnreadablePdf(err.to_string()),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

/// Failure classification recorded in the batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    UnreadablePdf,
    EncryptedPdf,
    WriteError,
    RuleExecutionError,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnreadablePdf => "UnreadablePdf",
            ErrorKind::EncryptedPdf => "EncryptedPdf",
            ErrorKind::WriteError => "WriteError",
            ErrorKind::RuleExecutionError => "RuleExecutionError",
            ErrorKind::Other => "Other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EncryptedPdf;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::RuleExecution {
            rule: "email",
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Rule 'email' failed: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            Error::UnreadablePdf("bad xref".into()).kind(),
            ErrorKind::UnreadablePdf
        );
        assert_eq!(Error::EncryptedPdf.kind(), ErrorKind::EncryptedPdf);
        let write = Error::write(
            "/out/a.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(write.kind(), ErrorKind::WriteError);
        assert!(write.to_string().contains("/out/a.json"));
    }

    #[test]
    fn test_error_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::UnreadablePdf).unwrap();
        assert_eq!(json, "\"UnreadablePdf\"");
        assert_eq!(ErrorKind::WriteError.to_string(), "WriteError");
    }
}
