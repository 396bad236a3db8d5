use thiserror::Error;

/// Failures talking to the routing server over HTTP.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to routing server failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("routing server returned {status}: {message}")]
    Server { status: u16, message: String },
}
