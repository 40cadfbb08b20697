//! Controller state
//!
//! Provides the state record owned by one controller, the per-call identity
//! token, and the detailed outcome of a single call.

use asyncstate_core::NormalizedError;
use std::fmt;

/// Current state of one controller instance
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState<T> {
    /// Last successfully produced value
    pub data: Option<T>,

    /// Whether the latest call is still outstanding
    pub loading: bool,

    /// Classified failure of the latest applied call
    pub error: Option<NormalizedError>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> OperationState<T> {
    /// Whether a value is present
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Whether a failure is present
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Data present and no error
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    /// Message of the current error
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message().to_string())
    }
}

/// Identity of one `execute` call within its controller.
///
/// Tokens are issued in strictly increasing order; only the holder of the
/// highest issued token may write its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallToken(pub(crate) u64);

impl CallToken {
    /// Raw counter value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a single call ended, and whether its outcome reached the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement<T> {
    /// Succeeded and was written to state
    Applied(T),

    /// Failed and the classified error was written to state
    Failed(NormalizedError),

    /// A newer call started before this one finished
    Superseded(Result<T, NormalizedError>),

    /// The owning scope ended before this call finished
    Detached(Result<T, NormalizedError>),
}

impl<T> Settlement<T> {
    /// Whether the outcome was written to state
    pub fn was_applied(&self) -> bool {
        matches!(self, Settlement::Applied(_) | Settlement::Failed(_))
    }

    /// The produced value, whether or not it was applied
    pub fn into_value(self) -> Option<T> {
        match self {
            Settlement::Applied(value)
            | Settlement::Superseded(Ok(value))
            | Settlement::Detached(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// The classified failure, whether or not it was applied
    pub fn error(&self) -> Option<&NormalizedError> {
        match self {
            Settlement::Failed(err)
            | Settlement::Superseded(Err(err))
            | Settlement::Detached(Err(err)) => Some(err),
            _ => None,
        }
    }

    /// Short description used in log fields
    pub fn describe(&self) -> &'static str {
        match self {
            Settlement::Applied(_) => "applied",
            Settlement::Failed(_) => "failed",
            Settlement::Superseded(_) => "superseded",
            Settlement::Detached(_) => "detached",
        }
    }
}
