use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use medtrack_core::FieldError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        errors: Vec<FieldError>,
        path: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Transport failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => status.is_server_error(),
            ClientError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClientError::Config(_) => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            ClientError::Config(_) => None,
        }
    }

    /// Field errors of a 400 validation failure; empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Api { errors, .. } => errors.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(parsed) => ClientError::Api {
                status,
                message: parsed.message,
                errors: parsed.errors,
                path: parsed.path,
            },
            Err(_) => ClientError::Api {
                status,
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string(),
                errors: Vec::new(),
                path: None,
            },
        }
    }
}

/// Server error body; only the fields the client surfaces.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
    #[serde(default)]
    path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_validation_body() {
        let body = br#"{"statusCode":400,"message":"Validation failed",
            "errors":[{"field":"name","message":"Name is required"}],
            "timestamp":"2024-06-15T09:00:00.000Z","path":"/patients"}"#;
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.field_errors()[0].field, "name");
        assert_eq!(err.to_string(), "400 Bad Request: Validation failed");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unparseable_body_uses_reason_phrase() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        match &err {
            ClientError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[test]
    fn test_config_is_not_retryable() {
        assert!(!ClientError::Config("bad".into()).is_retryable());
    }
}
