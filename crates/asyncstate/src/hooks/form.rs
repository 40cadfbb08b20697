//! Form-submission wrapper with per-field errors

use crate::config::{ErrorCallback, SuccessCallback};
use crate::controller::{AsyncController, ControllerBuilder};
use crate::state::OperationState;
use asyncstate_core::{Classify, FieldErrors, NormalizedError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Submits form data of type `F` and keeps the server's per-field messages.
///
/// Field errors live beside the controller state in their own channel so a
/// form can clear one field as the user edits it without touching the rest.
///
/// # Example
///
/// ```
/// use asyncstate::FormSubmission;
/// use asyncstate_core::{ApiError, ValidationError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let signup = FormSubmission::new(|email: String| async move {
///     if email.contains('@') {
///         Ok(email)
///     } else {
///         Err(ApiError::UnprocessableEntity {
///             message: "Invalid input".to_string(),
///             code: None,
///             errors: vec![ValidationError::new("email", "invalid")],
///         })
///     }
/// });
///
/// signup.submit("nope".to_string()).await;
/// assert_eq!(signup.field_error("email").as_deref(), Some("invalid"));
///
/// signup.clear_field_error("email");
/// assert!(signup.field_errors().is_empty());
/// # }
/// ```
pub struct FormSubmission<F, T> {
    controller: AsyncController<F, T>,
    field_errors: Arc<watch::Sender<FieldErrors>>,
}

impl<F, T> Clone for FormSubmission<F, T> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            field_errors: Arc::clone(&self.field_errors),
        }
    }
}

impl<F, T> FormSubmission<F, T>
where
    F: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a form submission with no callbacks
    pub fn new<Op, Fut, E>(operation: Op) -> Self
    where
        Op: Fn(F) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::builder(operation).build()
    }

    /// Start building a form submission
    pub fn builder<Op, Fut, E>(operation: Op) -> FormSubmissionBuilder<F, T, E>
    where
        Op: Fn(F) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        FormSubmissionBuilder {
            controller: AsyncController::builder(operation),
            on_success: None,
            on_error: None,
        }
    }

    /// Submit the form.
    ///
    /// Field errors are cleared before this returns. Resolves to the value on
    /// success and `None` on failure.
    pub fn submit(&self, form: F) -> impl Future<Output = Option<T>> + Send + 'static {
        if self.controller.is_mounted() {
            clear_all(&self.field_errors);
        }
        self.controller.execute(form)
    }

    /// Remove the message for one field. Returns whether it was present.
    pub fn clear_field_error(&self, field: &str) -> bool {
        self.field_errors
            .send_if_modified(|errors| errors.remove(field).is_some())
    }

    /// All field messages
    pub fn field_errors(&self) -> FieldErrors {
        self.field_errors.borrow().clone()
    }

    /// Message for one field
    pub fn field_error(&self, field: &str) -> Option<String> {
        self.field_errors.borrow().get(field).cloned()
    }

    /// Whether any field has a message
    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.borrow().is_empty()
    }

    /// Subscribe to field error changes
    pub fn subscribe_field_errors(&self) -> watch::Receiver<FieldErrors> {
        self.field_errors.subscribe()
    }

    /// Clear controller state and field errors
    pub fn reset(&self) {
        self.controller.reset();
        clear_all(&self.field_errors);
    }

    /// Data present and no error
    pub fn is_success(&self) -> bool {
        self.controller.is_success()
    }

    /// Current data
    pub fn data(&self) -> Option<T> {
        self.controller.data()
    }

    /// Whether a submit is outstanding
    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    /// Current error
    pub fn error(&self) -> Option<NormalizedError> {
        self.controller.error()
    }

    /// Message of the current error
    pub fn error_message(&self) -> Option<String> {
        self.controller.error_message()
    }

    /// Snapshot of the controller state
    pub fn state(&self) -> OperationState<T> {
        self.controller.state()
    }

    /// Subscribe to controller state changes
    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.controller.subscribe()
    }

    /// Underlying controller
    pub fn controller(&self) -> &AsyncController<F, T> {
        &self.controller
    }
}

fn clear_all(field_errors: &watch::Sender<FieldErrors>) {
    field_errors.send_if_modified(|errors| {
        let had_any = !errors.is_empty();
        errors.clear();
        had_any
    });
}

/// Builder for [`FormSubmission`]
pub struct FormSubmissionBuilder<F, T, E> {
    controller: ControllerBuilder<F, T, E>,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<F, T, E> FormSubmissionBuilder<F, T, E>
where
    F: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Set the label used in log fields
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.controller = self.controller.label(label);
        self
    }

    /// Replace the classifier
    pub fn classify_with<C>(mut self, classifier: C) -> Self
    where
        C: Fn(&E) -> NormalizedError + Send + Sync + 'static,
    {
        self.controller = self.controller.classify_with(classifier);
        self
    }

    /// Invoked after an applied success, once field errors are cleared
    pub fn on_success<C>(mut self, callback: C) -> Self
    where
        C: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Invoked after every applied failure
    pub fn on_error<C>(mut self, callback: C) -> Self
    where
        C: Fn(&NormalizedError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Build the form submission
    pub fn build(self) -> FormSubmission<F, T> {
        let (sender, _) = watch::channel(FieldErrors::new());
        let field_errors = Arc::new(sender);

        let on_success = self.on_success;
        let cleared = Arc::clone(&field_errors);
        let on_error = self.on_error;
        let replaced = Arc::clone(&field_errors);

        let controller = self
            .controller
            .on_success(move |value| {
                clear_all(&cleared);
                if let Some(callback) = &on_success {
                    callback(value);
                }
            })
            .on_error(move |err| {
                if let Some(fields) = err.field_errors().filter(|f| !f.is_empty()) {
                    debug!(fields = fields.len(), "Applying field errors");
                    replaced.send_replace(fields.clone());
                }
                if let Some(callback) = &on_error {
                    callback(err);
                }
            })
            .build();

        FormSubmission {
            controller,
            field_errors,
        }
    }
}
