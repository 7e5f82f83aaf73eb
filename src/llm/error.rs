use thiserror::Error;

/// Failure of a single call to an embedding or generation backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,
    #[error("service unreachable: {0}")]
    Unreachable(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed service response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    pub fn malformed<E: std::fmt::Display>(err: E) -> Self {
        ServiceError::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else {
            ServiceError::Unreachable(err.to_string())
        }
    }
}
