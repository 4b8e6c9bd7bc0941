use crate::domain::lookup::SourceFailure;
use crate::domain::violation::Jurisdiction;
use thiserror::Error;

pub type Result<T, E = CitationError> = std::result::Result<T, E>;

/// Errors that escalate to the caller: configuration, routing, and
/// whole-batch availability problems.
///
/// A fault local to a single source never shows up here; those are
/// collected as [`SourceFailure`] records alongside successful results.
#[derive(Error, Debug)]
pub enum CitationError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("a payer is already registered for {0}")]
    DuplicatePayer(Jurisdiction),

    #[error("no payer registered for {0}")]
    NoPayerRegistered(Jurisdiction),

    #[error("no citation sources registered for the requested jurisdictions")]
    NoSourcesResolved,

    #[error("all {} queried sources failed", .failures.len())]
    AllSourcesFailed { failures: Vec<SourceFailure> },

    #[error("validation error: {0}")]
    Validation(String),
}

/// A fault local to one remote source: the network, the portal, or its
/// payload. Finder and payer implementations return these; the
/// orchestrator attributes each one to the source that produced it.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("CSV payload error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON payload error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),
}
