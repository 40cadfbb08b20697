//! Controller and presentation configuration

use asyncstate_core::NormalizedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the value of an applied successful call
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the classified error of an applied failed call
pub type ErrorCallback = Arc<dyn Fn(&NormalizedError) + Send + Sync>;

/// Per-instance options for a controller
///
/// Callbacks run synchronously right after the state write of an applied
/// call. Stale or detached calls never invoke them.
pub struct ControllerOptions<T> {
    /// Human-readable name used in log fields
    pub label: Option<String>,

    /// Invoked after a successful call is applied
    pub on_success: Option<SuccessCallback<T>>,

    /// Invoked after a failed call is applied
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for ControllerOptions<T> {
    fn default() -> Self {
        Self {
            label: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> Clone for ControllerOptions<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<T> fmt::Debug for ControllerOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("label", &self.label)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<T> ControllerOptions<T> {
    /// Create options with no label and no callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the success callback
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Set the failure callback
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NormalizedError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

/// Copy used by the loading, error and empty views.
///
/// Every field has a default, so a partial JSON or TOML document is enough to
/// override just the strings a host cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Shown while loading
    pub loading_message: String,

    /// Title for generic failures
    pub error_title: String,

    /// Title for network failures
    pub network_error_title: String,

    /// Title for validation failures
    pub validation_error_title: String,

    /// Title when there is nothing to show
    pub empty_title: String,

    /// Optional second line when there is nothing to show
    pub empty_description: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            loading_message: "Loading...".to_string(),
            error_title: "Something went wrong".to_string(),
            network_error_title: "Connection problem".to_string(),
            validation_error_title: "Please check the highlighted fields".to_string(),
            empty_title: "Nothing here yet".to_string(),
            empty_description: None,
        }
    }
}

impl PresentationConfig {
    /// Create a config with default copy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the loading message
    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    /// Set the empty-state title and description
    pub fn with_empty(mut self, title: impl Into<String>, description: Option<String>) -> Self {
        self.empty_title = title.into();
        self.empty_description = description;
        self
    }

    /// Merge this configuration with another.
    ///
    /// Fields of `other` that differ from the defaults win, and a present
    /// `empty_description` wins. A field that `other` sets back to its default
    /// value does not override `self`.
    pub fn merge(mut self, other: PresentationConfig) -> Self {
        let defaults = PresentationConfig::default();
        if other.loading_message != defaults.loading_message {
            self.loading_message = other.loading_message;
        }
        if other.error_title != defaults.error_title {
            self.error_title = other.error_title;
        }
        if other.network_error_title != defaults.network_error_title {
            self.network_error_title = other.network_error_title;
        }
        if other.validation_error_title != defaults.validation_error_title {
            self.validation_error_title = other.validation_error_title;
        }
        if other.empty_title != defaults.empty_title {
            self.empty_title = other.empty_title;
        }
        if other.empty_description.is_some() {
            self.empty_description = other.empty_description;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_controller_options_builder() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);

        let options = ControllerOptions::<u32>::new()
            .with_label("posts")
            .on_success(move |n| {
                seen.fetch_add(*n, Ordering::SeqCst);
            });

        assert_eq!(options.label.as_deref(), Some("posts"));
        assert!(options.on_error.is_none());

        let cloned = options.clone();
        (cloned.on_success.unwrap())(&5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_controller_options_debug_hides_callbacks() {
        let options = ControllerOptions::<()>::new().on_error(|_| {});
        let debug = format!("{:?}", options);
        assert!(debug.contains("on_error: true"));
        assert!(debug.contains("on_success: false"));
    }

    #[test]
    fn test_presentation_config_partial_json() {
        let config: PresentationConfig =
            serde_json::from_str(r#"{"empty_title": "No posts yet"}"#).unwrap();

        assert_eq!(config.empty_title, "No posts yet");
        assert_eq!(config.loading_message, "Loading...");
        assert_eq!(config.empty_description, None);
    }

    #[test]
    fn test_presentation_config_merge() {
        let base = PresentationConfig::new().with_loading_message("Fetching quizzes...");
        let overrides = PresentationConfig::new().with_empty(
            "No quizzes",
            Some("Create your first quiz".to_string()),
        );

        let merged = base.merge(overrides);
        assert_eq!(merged.loading_message, "Fetching quizzes...");
        assert_eq!(merged.empty_title, "No quizzes");
        assert_eq!(
            merged.empty_description.as_deref(),
            Some("Create your first quiz")
        );
        assert_eq!(merged.error_title, "Something went wrong");
    }

    #[test]
    fn test_presentation_config_merge_ignores_default_values() {
        let base = PresentationConfig::new().with_loading_message("Fetching quizzes...");
        let overrides = PresentationConfig::new().with_loading_message("Loading...");

        let merged = base.merge(overrides);
        assert_eq!(merged.loading_message, "Fetching quizzes...");
    }
}
