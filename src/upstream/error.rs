#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
