//! Normalized error model.
//!
//! Every failure that reaches a controller is reduced to a [`NormalizedError`]
//! before it is stored or shown. The model is a tagged union so that each kind
//! only carries the fields that make sense for it: a network failure never has
//! field errors, a validation failure always does.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field name to validation message.
///
/// Ordered so that rendering the same failure twice lists fields in the same
/// order.
pub type FieldErrors = BTreeMap<String, String>;

/// Message used when a raised value carries no usable text.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Message used for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Coarse classification of a failure, used to pick icons and copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never produced a response (offline, refused, timed out).
    Network,
    /// The server rejected the input and reported per-field messages.
    Validation,
    /// Anything else.
    Generic,
}

impl ErrorKind {
    /// Stable lowercase name, suitable for structured log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, ready for display.
///
/// Values are built once per failed call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedError {
    /// Transport-level failure.
    #[error("{message}")]
    Network {
        /// Human-readable message
        message: String,
        /// Machine code, e.g. `NETWORK_ERROR` or `TIMEOUT`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// Input rejected with per-field messages.
    #[error("{message}")]
    Validation {
        /// Summary message
        message: String,
        /// Machine code reported by the server
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Per-field messages
        field_errors: FieldErrors,
    },

    /// Any other failure, reduced to a message.
    #[error("{message}")]
    Generic {
        /// Human-readable message
        message: String,
        /// Machine code, if the source provided one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// HTTP status, if the failure came from a response
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
}

impl NormalizedError {
    /// Build a network failure with the standard message.
    pub fn network(code: impl Into<String>) -> Self {
        NormalizedError::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            code: Some(code.into()),
        }
    }

    /// Build a validation failure.
    ///
    /// An empty `message` is replaced by a summary mentioning the field count.
    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            match field_errors.len() {
                1 => "1 field is invalid".to_string(),
                n => format!("{} fields are invalid", n),
            }
        } else {
            message
        };
        NormalizedError::Validation {
            message,
            code: None,
            field_errors,
        }
    }

    /// Build a generic failure. Blank messages fall back to
    /// [`UNEXPECTED_ERROR_MESSAGE`].
    pub fn generic(message: impl Into<String>) -> Self {
        NormalizedError::Generic {
            message: non_blank(message.into()),
            code: None,
            status: None,
        }
    }

    /// Attach a machine code, replacing any existing one.
    pub fn with_code(mut self, new_code: impl Into<String>) -> Self {
        match &mut self {
            NormalizedError::Network { code, .. }
            | NormalizedError::Validation { code, .. }
            | NormalizedError::Generic { code, .. } => *code = Some(new_code.into()),
        }
        self
    }

    /// Attach an HTTP status. Only generic failures carry one; other kinds are
    /// returned unchanged.
    pub fn with_status(mut self, new_status: u16) -> Self {
        if let NormalizedError::Generic { status, .. } = &mut self {
            *status = Some(new_status);
        }
        self
    }

    /// The kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizedError::Network { .. } => ErrorKind::Network,
            NormalizedError::Validation { .. } => ErrorKind::Validation,
            NormalizedError::Generic { .. } => ErrorKind::Generic,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        match self {
            NormalizedError::Network { message, .. }
            | NormalizedError::Validation { message, .. }
            | NormalizedError::Generic { message, .. } => message,
        }
    }

    /// Machine code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            NormalizedError::Network { code, .. }
            | NormalizedError::Validation { code, .. }
            | NormalizedError::Generic { code, .. } => code.as_deref(),
        }
    }

    /// HTTP status of a generic failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            NormalizedError::Generic { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the failure happened below the HTTP layer.
    pub fn is_network_error(&self) -> bool {
        matches!(self, NormalizedError::Network { .. })
    }

    /// Per-field messages of a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            NormalizedError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Message for a single field, if this is a validation failure naming it.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors()
            .and_then(|errors| errors.get(field))
            .map(String::as_str)
    }
}

pub(crate) fn non_blank(message: String) -> String {
    if message.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
