//! HTTP error types

use thiserror::Error;

/// Which of the three request deadlines fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// Establishing the connection took longer than the connect timeout
    Connect,
    /// The server did not send response headers in time
    ResponseHeader,
    /// The whole request/response cycle exceeded the total timeout
    Total,
}

impl std::fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutPhase::Connect => write!(f, "connect"),
            TimeoutPhase::ResponseHeader => write!(f, "response header"),
            TimeoutPhase::Total => write!(f, "total"),
        }
    }
}

/// Coarse classification of an [`HttpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client could not be built; no builder exists
    Construction,
    /// Rejected before any network I/O
    Validation,
    /// Failed while talking to the server
    Transport,
    /// The response arrived but could not be decoded
    Decode,
}

/// HTTP errors that can occur during requests
#[derive(Debug, Error)]
pub enum HttpError {
    /// URL failed the pre-flight check
    #[error("invalid url, lost http/https?: {0}")]
    InvalidUrl(String),
    /// Method is not one of the supported verbs
    #[error("invalid method: {0:?}")]
    InvalidMethod(String),
    /// Header name or value cannot be sent
    #[error("invalid header `{name}` for {url}: {reason}")]
    InvalidHeader {
        /// Header name as given to the builder
        name: String,
        /// Target of the request
        url: String,
        /// Why the name or value was refused
        reason: String,
    },
    /// HTTP error with status code
    #[error("HTTP error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timeout
    #[error("Request timeout ({phase}) for {url}")]
    Timeout {
        /// Deadline that fired first
        phase: TimeoutPhase,
        /// Target of the request
        url: String,
    },
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Key path not present in the JSON payload
    #[error("Key path not found: {0}")]
    KeyPathNotFound(String),
    /// Proxy error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl HttpError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Proxy(_) | HttpError::Build(_) => ErrorKind::Construction,
            HttpError::InvalidUrl(_)
            | HttpError::InvalidMethod(_)
            | HttpError::InvalidHeader { .. } => ErrorKind::Validation,
            HttpError::Status { .. }
            | HttpError::Connection(_)
            | HttpError::Timeout { .. }
            | HttpError::Other(_) => ErrorKind::Transport,
            HttpError::Serialization(_) | HttpError::KeyPathNotFound(_) => ErrorKind::Decode,
        }
    }

    /// Returns true if any of the request deadlines fired
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout { .. })
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if err.is_timeout() {
            let phase = if err.is_connect() {
                TimeoutPhase::Connect
            } else {
                TimeoutPhase::Total
            };
            HttpError::Timeout { phase, url }
        } else if err.is_builder() {
            HttpError::Build(err.to_string())
        } else if let Some(status) = err.status() {
            HttpError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_connect() {
            HttpError::Connection(err.to_string())
        } else if err.is_decode() {
            HttpError::Serialization(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_status_display() {
        let error = HttpError::Status {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(format!("{}", error), "HTTP error (404): Not Found");
    }

    #[test]
    fn test_http_error_invalid_url_display() {
        let error = HttpError::InvalidUrl("ftp://x".to_string());
        assert_eq!(
            format!("{}", error),
            "invalid url, lost http/https?: ftp://x"
        );
    }

    #[test]
    fn test_http_error_invalid_method_display() {
        let error = HttpError::InvalidMethod("PATCH".to_string());
        assert_eq!(format!("{}", error), "invalid method: \"PATCH\"");
    }

    #[test]
    fn test_http_error_invalid_header_display() {
        let error = HttpError::InvalidHeader {
            name: "bad header".to_string(),
            url: "http://localhost:1/".to_string(),
            reason: "invalid HTTP header name".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "invalid header `bad header` for http://localhost:1/: invalid HTTP header name"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_http_error_timeout_display() {
        let error = HttpError::Timeout {
            phase: TimeoutPhase::ResponseHeader,
            url: "http://localhost:1/".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Request timeout (response header) for http://localhost:1/"
        );
        assert!(error.is_timeout());
    }

    #[test]
    fn test_http_error_proxy_display() {
        let error = HttpError::Proxy("proxy unreachable".to_string());
        assert_eq!(format!("{}", error), "Proxy error: proxy unreachable");
    }

    #[test]
    fn test_http_error_other_display() {
        let error = HttpError::Other("unknown error".to_string());
        assert_eq!(format!("{}", error), "unknown error");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            HttpError::InvalidUrl(String::new()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            HttpError::InvalidMethod(String::new()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(HttpError::Proxy(String::new()).kind(), ErrorKind::Construction);
        assert_eq!(
            HttpError::Connection(String::new()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            HttpError::KeyPathNotFound("a.b".to_string()).kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("not valid json");
        let json_error = result.expect_err("Invalid JSON should produce an error");
        let http_error: HttpError = json_error.into();

        match http_error {
            HttpError::Serialization(msg) => {
                assert!(
                    msg.contains("expected"),
                    "Error message should describe JSON error"
                );
            }
            _ => panic!("Expected HttpError::Serialization"),
        }
    }
}
