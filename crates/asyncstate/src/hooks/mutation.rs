//! Mutation wrapper

use crate::config::ControllerOptions;
use crate::controller::AsyncController;
use crate::state::OperationState;
use asyncstate_core::{Classify, NormalizedError};
use std::future::Future;
use tokio::sync::watch;

/// User-triggered write such as liking a post or deleting a quiz.
///
/// `mutate` never fails; failures land in [`error`](Self::error). Nothing is
/// invalidated or refetched afterwards.
pub struct Mutation<A, T> {
    controller: AsyncController<A, T>,
}

impl<A, T> Clone for Mutation<A, T> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
        }
    }
}

impl<A, T> Mutation<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a mutation
    pub fn new<F, Fut, E>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::from_controller(AsyncController::new(operation))
    }

    /// Create a mutation with options
    pub fn with_options<F, Fut, E>(operation: F, options: ControllerOptions<T>) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::from_controller(AsyncController::with_options(operation, options))
    }

    /// Wrap an existing controller
    pub fn from_controller(controller: AsyncController<A, T>) -> Self {
        Self { controller }
    }

    /// Run the mutation. Resolves to the value on success and `None` on
    /// failure.
    pub fn mutate(&self, args: A) -> impl Future<Output = Option<T>> + Send + 'static {
        self.controller.execute(args)
    }

    /// Clear data, loading and error
    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Data present and no error
    pub fn is_success(&self) -> bool {
        self.controller.is_success()
    }

    /// Current data
    pub fn data(&self) -> Option<T> {
        self.controller.data()
    }

    /// Whether the mutation is outstanding
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

    /// Snapshot of the whole state
    pub fn state(&self) -> OperationState<T> {
        self.controller.state()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.controller.subscribe()
    }

    /// Underlying controller
    pub fn controller(&self) -> &AsyncController<A, T> {
        &self.controller
    }
}
