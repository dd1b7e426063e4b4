//! Error type shared by the transforms, the fetch layer and the assets.
//!
//! Library functions return [`Result`], which defaults its error to
//! [`IngestError`]. The binary boxes these at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while materializing an asset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A row lacks a column the transform needs (e.g. `longitude`).
    #[error("record is missing required field '{field}'")]
    MissingField {
        /// The absent column name
        field: String,
    },

    /// A coordinate cell holds something that is not a number.
    #[error("field '{field}' is not numeric: {value:?}")]
    NonNumericField {
        /// The column name
        field: String,
        /// The offending cell
        value: String,
    },

    /// Transport-level request failure (DNS, TLS, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Http {
        /// Requested URL
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be constructed (TLS backend, proxy settings).
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status
        status: reqwest::StatusCode,
    },

    /// An endpoint could not be built from the configured base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The YAML configuration file could not be parsed.
    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        /// Config file path
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A row or column does not line up with the table shape.
    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RaggedRow {
        /// Zero-based row position
        row: usize,
        /// Number of columns in the table
        expected: usize,
        /// Number of cells supplied
        found: usize,
    },
}

impl IngestError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a fetch that failed with this error is worth retrying.
    ///
    /// Transport failures, 5xx and 429 are transient; anything else will
    /// fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            IngestError::Http { .. } => true,
            IngestError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = IngestError> = std::result::Result<T, E>;
