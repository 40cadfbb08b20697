//! View models for the loading, error and empty renderings

use crate::config::PresentationConfig;
use asyncstate_core::{ErrorKind, FieldErrors, NormalizedError};
use serde::Serialize;
use std::fmt;

/// Props for a loading indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingState {
    /// Text shown beside the indicator
    pub message: String,
}

impl LoadingState {
    /// Loading view from config copy
    pub fn from_config(config: &PresentationConfig) -> Self {
        Self {
            message: config.loading_message.clone(),
        }
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Props for an error panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    /// Classification of the failure
    pub kind: ErrorKind,
    /// Heading chosen by kind
    pub title: String,
    /// Classified message
    pub message: String,
    /// Per-field messages for validation failures
    pub field_errors: FieldErrors,
    /// Whether a retry action should be offered
    pub retryable: bool,
}

impl ErrorState {
    /// Build the error view for `error`
    pub fn new(error: &NormalizedError, config: &PresentationConfig, retryable: bool) -> Self {
        let title = match error.kind() {
            ErrorKind::Network => &config.network_error_title,
            ErrorKind::Validation => &config.validation_error_title,
            ErrorKind::Generic => &config.error_title,
        };

        Self {
            kind: error.kind(),
            title: title.clone(),
            message: error.message().to_string(),
            field_errors: error.field_errors().cloned().unwrap_or_default(),
            retryable,
        }
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        for (field, message) in &self.field_errors {
            write!(f, "\n  {field}: {message}")?;
        }
        if self.retryable {
            write!(f, "\n  [retry]")?;
        }
        Ok(())
    }
}

/// Props for an empty-state placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    /// Heading
    pub title: String,
    /// Optional second line
    pub description: Option<String>,
}

impl EmptyState {
    /// Empty view from config copy
    pub fn from_config(config: &PresentationConfig) -> Self {
        Self {
            title: config.empty_title.clone(),
            description: config.empty_description.clone(),
        }
    }
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(description) = &self.description {
            write!(f, "\n{description}")?;
        }
        Ok(())
    }
}
