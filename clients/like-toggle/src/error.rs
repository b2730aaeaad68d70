use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a like/unlike request as seen by the client.
///
/// Every variant rolls the toggle back; the distinction only shapes the
/// notice text and the log line.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Event stream error: {0}")]
    Stream(String),
}

impl ApiError {
    /// Map a non-success response to an error, using the server's `error`
    /// field when the body carries one.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            other => ApiError::UnexpectedStatus {
                status: other.as_u16(),
                message,
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "Post not found".into()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "Post already liked".into()),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "Missing token".into()),
            ApiError::Unauthorized(_)
        ));
        match ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()) {
            ApiError::UnexpectedStatus { status, .. } => assert_eq!(status, 502),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let err = ApiError::Conflict("Post already liked".into());
        assert_eq!(err.to_string(), "Conflict: Post already liked");
    }
}
