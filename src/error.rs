//! Error taxonomy for commands that must abort.
//!
//! Only failures that terminate a command live here: configuration problems,
//! an unreachable listings API, invalid user input and output I/O. Everything
//! that can degrade (an unparseable date, a missing record field, an
//! unreachable company page) is absorbed where it happens and never becomes
//! an [`AppError`].

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    /// No usable listings credential was supplied.
    #[error("listings API key is not configured (set ITJOBS_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Transport-level failure (DNS, connect, timeout, body decode).
    #[error("request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("unexpected payload from listings API: {0}")]
    UnexpectedPayload(String),

    /// A page that is the primary data source of a command could not be fetched.
    #[error("could not fetch {0}")]
    PageUnavailable(String),

    #[error("could not interpret date '{0}' (try YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: String, end: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the failure was caused by the invocation itself rather than
    /// the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDate(_) | AppError::InvalidRange { .. }
        )
    }
}
