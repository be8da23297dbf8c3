use thiserror::Error;

/// Why a backend call failed.
///
/// Never returned to callers: [`ApiClient`](super::ApiClient) renders it into
/// the `message` of a failed envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("request failed: {0}")]
    Connection(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        if err.is_data() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Decode(err.to_string())
        }
    }
}
