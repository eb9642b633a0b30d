use std::time::Duration;
use thiserror::Error;

/// Failures of the remote smart matcher. These never escape
/// [`crate::smart::match_with_fallback`]; they only decide whether the
/// local heuristic is used.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("remote matcher failed: {0}")]
    Remote(String),

    #[error("remote matcher timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote matcher returned no assignments")]
    EmptyResponse,

    #[error("malformed remote response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
