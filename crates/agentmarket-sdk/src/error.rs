//! SDK error types

/// SDK-specific errors
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// SDK Result type
pub type SdkResult<T> = std::result::Result<T, SdkError>;

impl SdkError {
    /// HTTP status returned by the server, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::ApiError { status, .. } => Some(*status),
            SdkError::NetworkError(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short stable label (snake_case) for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SdkError::ConnectionFailed(_) => "connection_failed",
            SdkError::ApiError { .. } => "api_error",
            SdkError::NetworkError(err) if err.is_timeout() => "timeout",
            SdkError::NetworkError(_) => "network_error",
            SdkError::SerializationError(_) => "serialization_error",
            SdkError::ConfigError(_) => "config_error",
        }
    }

    /// Human-readable detail; the raw response body for API errors.
    pub fn message(&self) -> String {
        match self {
            SdkError::ApiError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether a repeat of the same request could plausibly succeed.
    ///
    /// Timeouts, refused connections, 408, 425, 429 and 5xx are transient.
    /// Other client errors, undecodable bodies and bad configuration are not.
    pub fn is_transient(&self) -> bool {
        match self {
            SdkError::ApiError { status, .. } => {
                matches!(*status, 408 | 425 | 429) || (500..=599).contains(status)
            }
            SdkError::NetworkError(err) => {
                if let Some(status) = err.status() {
                    let status = status.as_u16();
                    return matches!(status, 408 | 425 | 429) || (500..=599).contains(&status);
                }
                err.is_timeout() || err.is_connect() || err.is_request()
            }
            SdkError::ConnectionFailed(_)
            | SdkError::SerializationError(_)
            | SdkError::ConfigError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> SdkError {
        SdkError::ApiError {
            status,
            message: format!("status {status}"),
        }
    }

    #[test]
    fn test_sdk_error_display() {
        let err = api(400);
        assert_eq!(err.to_string(), "API error: 400 - status 400");
        assert_eq!(err.message(), "status 400");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), "api_error");
    }

    #[test]
    fn test_transient_statuses() {
        for status in [408, 425, 429, 500, 502, 503, 504] {
            assert!(api(status).is_transient(), "{status} should be transient");
        }
        for status in [400, 401, 403, 404, 409, 422] {
            assert!(!api(status).is_transient(), "{status} should not be transient");
        }
    }

    #[test]
    fn test_local_errors_are_not_transient() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(!SdkError::from(json_err).is_transient());
        assert!(!SdkError::ConfigError("bad".into()).is_transient());
        assert!(!SdkError::ConnectionFailed("tls".into()).is_transient());
    }

    #[test]
    fn test_not_found() {
        assert!(api(404).is_not_found());
        assert!(!api(400).is_not_found());
        assert!(!SdkError::ConfigError("x".into()).is_not_found());
    }
}
