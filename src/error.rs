//! Error types for data loading and view operations, plus user-facing
//! message formatting.
//!
//! Messages are produced by matching on the typed failure rather than on
//! the rendered error string.

use std::fmt;
use std::io;
use thiserror::Error;

/// Why a dataset could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Reading a local file failed
    #[error("{message}")]
    Io { kind: io::ErrorKind, message: String },
    /// The server answered with a non-success status
    #[error("HTTP {code} {text}")]
    Status { code: u16, text: String },
    /// The request never produced a response (DNS, refused, timeout...)
    #[error("{0}")]
    Transport(String),
}

impl From<io::Error> for FetchFailure {
    fn from(err: io::Error) -> Self {
        FetchFailure::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Failure while loading a table from a data source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("could not fetch {origin}: {reason}")]
    Fetch { origin: String, reason: FetchFailure },

    #[error("could not parse {origin}: {reason}")]
    Parse { origin: String, reason: String },
}

impl SourceError {
    pub fn fetch(origin: impl Into<String>, reason: impl Into<FetchFailure>) -> Self {
        SourceError::Fetch {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(origin: impl Into<String>, reason: impl fmt::Display) -> Self {
        SourceError::Parse {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Where the failed load was reading from (file path or URL without key).
    pub fn origin(&self) -> &str {
        match self {
            SourceError::Fetch { origin, .. } | SourceError::Parse { origin, .. } => origin,
        }
    }
}

/// Failure of a view operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("unknown column: {0}")]
    InvalidColumn(String),
}

/// Format a load failure as a one-line message for the status bar.
pub fn user_message(err: &SourceError) -> String {
    match err {
        SourceError::Fetch { origin, reason } => match reason {
            FetchFailure::Io { kind, .. } => {
                let base = match kind {
                    io::ErrorKind::NotFound => "Data file not found.",
                    io::ErrorKind::PermissionDenied => "Permission denied. Check read access.",
                    _ => "Could not read the data file.",
                };
                format!("{} ({})", base, origin)
            }
            FetchFailure::Status { code, .. } => match code {
                400 => "The data service rejected the request. Check the sheet range.".to_string(),
                401 | 403 => "The data service refused access. Check the API key.".to_string(),
                404 => "Spreadsheet not found. Check the spreadsheet id.".to_string(),
                429 => "The data service is rate limiting requests. Try again later.".to_string(),
                500..=599 => format!("The data service failed (HTTP {}). Try again later.", code),
                _ => format!("The data service answered HTTP {}.", code),
            },
            FetchFailure::Transport(_) => {
                "Could not reach the data service. Check your connection.".to_string()
            }
        },
        SourceError::Parse { origin, .. } => {
            format!("Data from {} is not in the expected format.", origin)
        }
    }
}
