#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core error model for the asyncstate ecosystem.
//!
//! This crate owns everything a controller needs to know about failures,
//! without knowing anything about controllers:
//!
//! - **HTTP client errors** via [`ApiError`]
//!   - Status-code taxonomy parsed from the backend's JSON error envelope
//!   - Network detection for connection failures and timeouts
//! - **Normalized errors** via [`NormalizedError`]
//!   - One tagged variant per [`ErrorKind`] (network, validation, generic)
//!   - Per-field messages as [`FieldErrors`]
//! - **Classification** via the [`Classify`] trait
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use asyncstate_core::prelude::*;
//!
//! let err = ApiError::Connection("connection refused".to_string());
//! let normalized = err.classify();
//!
//! assert!(normalized.is_network_error());
//! assert_eq!(normalized.kind(), ErrorKind::Network);
//! ```

pub mod api_error;
pub mod classify;
pub mod normalized;

pub use api_error::{ApiError, Result, ValidationError};
pub use classify::Classify;
pub use normalized::{
    ErrorKind, FieldErrors, NETWORK_ERROR_MESSAGE, NormalizedError, UNEXPECTED_ERROR_MESSAGE,
};

/// Convenient re-exports of commonly used items.
///
/// Import all core types with:
///
/// ```rust
/// use asyncstate_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api_error::{ApiError, ValidationError};
    pub use crate::classify::Classify;
    pub use crate::normalized::{ErrorKind, FieldErrors, NormalizedError};
}
