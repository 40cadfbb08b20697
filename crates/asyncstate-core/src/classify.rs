//! Error classification.
//!
//! [`Classify`] is the capability a controller needs from whatever its
//! operation raises: turn it into a [`NormalizedError`] and tell whether it
//! was a network failure.

use crate::api_error::{ApiError, is_connection_io_error};
use crate::normalized::{NormalizedError, non_blank};

/// Turns a raised value into a displayable [`NormalizedError`].
///
/// # Example
///
/// ```
/// use asyncstate_core::{ApiError, Classify, ErrorKind};
///
/// let err = ApiError::from_response(422, r#"{"errors": {"email": "invalid"}}"#);
/// let normalized = err.classify();
///
/// assert_eq!(normalized.kind(), ErrorKind::Validation);
/// assert_eq!(normalized.field_error("email"), Some("invalid"));
/// ```
pub trait Classify {
    /// Produce the normalized form of this failure.
    fn classify(&self) -> NormalizedError;

    /// Whether this failure happened below the HTTP layer.
    fn is_network_error(&self) -> bool {
        self.classify().is_network_error()
    }
}

impl Classify for NormalizedError {
    fn classify(&self) -> NormalizedError {
        self.clone()
    }

    fn is_network_error(&self) -> bool {
        NormalizedError::is_network_error(self)
    }
}

impl Classify for ApiError {
    fn classify(&self) -> NormalizedError {
        if ApiError::is_network_error(self) {
            let code = match self {
                ApiError::Timeout { .. } => "TIMEOUT",
                _ => "NETWORK_ERROR",
            };
            return NormalizedError::network(code);
        }

        let message = self
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string());

        if let Some(field_errors) = self.field_errors() {
            let code = self.code().unwrap_or("VALIDATION_ERROR");
            return NormalizedError::validation(message, field_errors).with_code(code);
        }

        let mut normalized = NormalizedError::generic(message);
        if let Some(code) = self.code() {
            normalized = normalized.with_code(code);
        }
        if let Some(status) = self.status() {
            normalized = normalized.with_status(status);
        }
        normalized
    }

    fn is_network_error(&self) -> bool {
        ApiError::is_network_error(self)
    }
}

impl Classify for std::io::Error {
    fn classify(&self) -> NormalizedError {
        if is_connection_io_error(self) {
            NormalizedError::network("NETWORK_ERROR")
        } else {
            NormalizedError::generic(self.to_string())
        }
    }

    fn is_network_error(&self) -> bool {
        is_connection_io_error(self)
    }
}

impl Classify for anyhow::Error {
    fn classify(&self) -> NormalizedError {
        // The first recognizable cause in the chain decides
        for cause in self.chain() {
            if let Some(classified) = classify_known(cause) {
                return classified;
            }
        }
        NormalizedError::generic(self.to_string())
    }
}

impl Classify for Box<dyn std::error::Error + Send + Sync> {
    fn classify(&self) -> NormalizedError {
        let err: &(dyn std::error::Error + 'static) = self.as_ref();
        classify_known(err).unwrap_or_else(|| NormalizedError::generic(self.to_string()))
    }
}

impl Classify for String {
    fn classify(&self) -> NormalizedError {
        NormalizedError::generic(non_blank(self.clone()))
    }
}

impl Classify for &'static str {
    fn classify(&self) -> NormalizedError {
        NormalizedError::generic(*self)
    }
}

#[cfg(feature = "reqwest")]
impl Classify for reqwest::Error {
    fn classify(&self) -> NormalizedError {
        if self.is_timeout() {
            NormalizedError::network("TIMEOUT")
        } else if self.is_connect() || self.is_request() {
            NormalizedError::network("NETWORK_ERROR")
        } else {
            let normalized = NormalizedError::generic(self.to_string());
            match self.status() {
                Some(status) => normalized.with_status(status.as_u16()),
                None => normalized,
            }
        }
    }
}

fn classify_known(err: &(dyn std::error::Error + 'static)) -> Option<NormalizedError> {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return Some(api.classify());
    }
    if let Some(normalized) = err.downcast_ref::<NormalizedError>() {
        return Some(normalized.clone());
    }
    if let Some(io) = err.downcast_ref::<std::io::Error>() {
        return Some(io.classify());
    }
    None
}
