use std::path::PathBuf;

use thiserror::Error;

/// Result type for parsing, resolution and export operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A document could not be read from disk
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document bytes are not valid UTF-8
    #[error("{path:?} is not valid UTF-8")]
    Encoding { path: PathBuf },

    /// The document lacks structure the parser depends on
    #[error("failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    /// No roster candidate shares anything with the speaker label
    #[error("resolution failed for label {label}")]
    ResolutionFailed { label: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The server answered with an error status
    #[error("{url}: {status}")]
    Download { url: String, status: String },

    /// A link could not be turned into an absolute URL
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
