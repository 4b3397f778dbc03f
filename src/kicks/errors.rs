//! Error types for the pricing API client.

/// Why an upstream search did not produce a payload.
///
/// `Clone` because a single failed call resolves every caller coalesced onto it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("KICKSDB_KEY is not configured")]
    MissingCredential,
    #[error("upstream responded with status {status}")]
    Status { status: u16, detail: String },
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream response could not be parsed: {0}")]
    Malformed(String),
    #[error("upstream fetch aborted: {0}")]
    Aborted(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
