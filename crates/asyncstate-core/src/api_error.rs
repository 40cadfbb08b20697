//! Error types raised by the HTTP client.
//!
//! This module mirrors the status-code taxonomy of the REST backend with the
//! `thiserror` crate. Controllers never inspect these variants directly; they
//! go through [`Classify`](crate::Classify).

use crate::normalized::FieldErrors;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for HTTP client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced while talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the server
        message: String,
        /// Machine code from the server
        code: Option<String>,
        /// Per-field messages, when the server reported them
        errors: Vec<ValidationError>,
    },

    /// Authentication failed (401).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Permission denied (403).
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Resource not found (404).
    #[error("Resource not found: {message}")]
    NotFound {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Conflict (409), e.g. a duplicate email on sign-up.
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Unprocessable entity (422).
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
        /// Validation errors
        errors: Vec<ValidationError>,
    },

    /// Rate limit exceeded (429).
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Server-side failure (500-599).
    #[error("Internal server error (status {status}): {message}")]
    InternalServerError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// Any other non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
        /// Machine code from the server
        code: Option<String>,
    },

    /// The response body could not be understood.
    #[error("Failed to parse API response: {0}")]
    ResponseValidation(String),

    /// Network or connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout {
        /// Configured timeout, when known
        after: Option<Duration>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors not covered by specific variants.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Validation message
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ApiError {
    /// Create an error from a non-success HTTP response.
    ///
    /// The body is parsed as the backend's JSON error envelope when possible
    /// and used verbatim as the message otherwise.
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let (message, code, errors) = match envelope {
            Some(envelope) => {
                let errors = envelope.errors.map(ErrorList::into_vec).unwrap_or_default();
                let message = envelope
                    .message
                    .or_else(|| errors.first().map(|e| e.message.clone()))
                    .unwrap_or_else(|| default_status_message(status).to_string());
                (message, envelope.code.or(envelope.error), errors)
            }
            None if body.trim().is_empty() => {
                (default_status_message(status).to_string(), None, Vec::new())
            }
            None => (body.trim().to_string(), None, Vec::new()),
        };

        match status {
            400 => ApiError::BadRequest {
                message,
                code,
                errors,
            },
            401 => ApiError::Authentication { message, code },
            403 => ApiError::PermissionDenied { message, code },
            404 => ApiError::NotFound { message, code },
            409 => ApiError::Conflict { message, code },
            422 => ApiError::UnprocessableEntity {
                message,
                code,
                errors,
            },
            429 => ApiError::RateLimit { message, code },
            500..=599 => ApiError::InternalServerError {
                status,
                message,
                code,
            },
            _ => ApiError::Api {
                status,
                message,
                code,
            },
        }
    }

    /// HTTP status this error corresponds to, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Authentication { .. } => Some(401),
            ApiError::PermissionDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::UnprocessableEntity { .. } => Some(422),
            ApiError::RateLimit { .. } => Some(429),
            ApiError::InternalServerError { status, .. } | ApiError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Machine code reported by the server.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { code, .. }
            | ApiError::Authentication { code, .. }
            | ApiError::PermissionDenied { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::UnprocessableEntity { code, .. }
            | ApiError::RateLimit { code, .. }
            | ApiError::InternalServerError { code, .. }
            | ApiError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Message without the variant prefix used by `Display`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Authentication { message, .. }
            | ApiError::PermissionDenied { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::UnprocessableEntity { message, .. }
            | ApiError::RateLimit { message, .. }
            | ApiError::InternalServerError { message, .. }
            | ApiError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Per-field messages, if the server reported any.
    ///
    /// Later entries for the same field override earlier ones.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        let errors = match self {
            ApiError::BadRequest { errors, .. } | ApiError::UnprocessableEntity { errors, .. } => {
                errors
            }
            _ => return None,
        };
        if errors.is_empty() {
            return None;
        }
        Some(
            errors
                .iter()
                .map(|e| (e.field.clone(), e.message.clone()))
                .collect(),
        )
    }

    /// Whether the request failed below the HTTP layer.
    pub fn is_network_error(&self) -> bool {
        match self {
            ApiError::Connection(_) | ApiError::Timeout { .. } => true,
            ApiError::Io(err) => is_connection_io_error(err),
            _ => false,
        }
    }
}

pub(crate) fn is_connection_io_error(err: &std::io::Error) -> bool {
    use std::io::ErrorKind as Io;
    matches!(
        err.kind(),
        Io::ConnectionRefused
            | Io::ConnectionReset
            | Io::ConnectionAborted
            | Io::NotConnected
            | Io::TimedOut
            | Io::BrokenPipe
            | Io::UnexpectedEof
    )
}

fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid",
        401 => "Please sign in to continue",
        403 => "You do not have permission to do that",
        404 => "The requested resource was not found",
        409 => "The resource already exists",
        422 => "Some fields are invalid",
        429 => "Too many requests. Please slow down",
        500..=599 => "The server encountered an error",
        _ => "The request failed",
    }
}

// Helper structures for parsing the backend's error envelope

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<ErrorList>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ErrorList {
    List(Vec<EnvelopeFieldError>),
    Map(std::collections::BTreeMap<String, String>),
}

#[derive(Debug, serde::Deserialize)]
struct EnvelopeFieldError {
    #[serde(alias = "path", alias = "param")]
    field: String,
    #[serde(alias = "msg")]
    message: String,
}

impl ErrorList {
    fn into_vec(self) -> Vec<ValidationError> {
        match self {
            ErrorList::List(items) => items
                .into_iter()
                .map(|e| ValidationError::new(e.field, e.message))
                .collect(),
            ErrorList::Map(map) => map
                .into_iter()
                .map(|(field, message)| ValidationError::new(field, message))
                .collect(),
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { after: None }
        } else if err.is_connect() || err.is_request() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::ResponseValidation(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_response(status.as_u16(), "")
        } else {
            ApiError::Other(anyhow::Error::new(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_list_envelope() {
        let body = r#"{
            "success": false,
            "message": "Validation failed",
            "code": "VALIDATION_ERROR",
            "errors": [
                {"field": "email", "message": "Email is invalid"},
                {"path": "password", "msg": "Too short"}
            ]
        }"#;

        let err = ApiError::from_response(422, body);
        match &err {
            ApiError::UnprocessableEntity {
                message,
                code,
                errors,
            } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(code.as_deref(), Some("VALIDATION_ERROR"));
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1], ValidationError::new("password", "Too short"));
            }
            other => panic!("Expected UnprocessableEntity, got {:?}", other),
        }

        let fields = err.field_errors().unwrap();
        assert_eq!(fields["email"], "Email is invalid");
        assert_eq!(fields["password"], "Too short");
    }

    #[test]
    fn test_from_response_map_envelope() {
        let body = r#"{"errors": {"title": "Title is required"}}"#;
        let err = ApiError::from_response(400, body);

        assert_eq!(err.status(), Some(400));
        // Falls back to the first field message when no summary is given
        assert_eq!(err.server_message(), Some("Title is required"));
        assert_eq!(
            err.field_errors().unwrap().get("title").map(String::as_str),
            Some("Title is required")
        );
    }

    #[test]
    fn test_from_response_error_key_becomes_code() {
        let err = ApiError::from_response(409, r#"{"error": "DUPLICATE", "message": "Email taken"}"#);
        assert!(matches!(err, ApiError::Conflict { ref message, .. } if message == "Email taken"));
        assert_eq!(err.code(), Some("DUPLICATE"));

        let err = ApiError::from_response(418, r#"{"error": "TEAPOT", "message": "No coffee"}"#);
        assert_eq!(err.code(), Some("TEAPOT"));
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn test_from_response_plain_text_and_empty_bodies() {
        let err = ApiError::from_response(404, "Post not found\n");
        assert!(matches!(err, ApiError::NotFound { ref message, code: None } if message == "Post not found"));

        let err = ApiError::from_response(503, "");
        assert!(matches!(err, ApiError::InternalServerError { status: 503, .. }));
        assert_eq!(err.server_message(), Some("The server encountered an error"));
    }

    #[test]
    fn test_from_response_keeps_code_for_every_status() {
        for status in [401, 403, 404, 409, 429, 500, 502] {
            let err = ApiError::from_response(status, r#"{"message": "nope", "code": "E_CODE"}"#);
            assert_eq!(err.code(), Some("E_CODE"), "status {status}");
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.server_message(), Some("nope"));
        }
    }

    #[test]
    fn test_from_response_keeps_exact_server_status() {
        let err = ApiError::from_response(503, r#"{"message": "Maintenance"}"#);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Internal server error (status 503): Maintenance");

        // Outside the 5xx range falls through to the generic variant
        let err = ApiError::from_response(600, "odd");
        assert!(matches!(err, ApiError::Api { status: 600, .. }));
    }

    #[test]
    fn test_is_network_error() {
        assert!(ApiError::Connection("refused".to_string()).is_network_error());
        assert!(ApiError::Timeout { after: None }.is_network_error());
        assert!(
            ApiError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset))
                .is_network_error()
        );
        assert!(
            !ApiError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)).is_network_error()
        );
        assert!(
            !ApiError::NotFound {
                message: "gone".to_string(),
                code: None
            }
            .is_network_error()
        );
    }

    #[test]
    fn test_field_errors_absent_without_entries() {
        let err = ApiError::BadRequest {
            message: "nope".to_string(),
            code: None,
            errors: Vec::new(),
        };
        assert!(err.field_errors().is_none());
        assert!(
            ApiError::Authentication {
                message: "x".to_string(),
                code: None
            }
            .field_errors()
            .is_none()
        );
    }
}
