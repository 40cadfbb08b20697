//! Fetch-on-activation wrapper

use crate::config::ControllerOptions;
use crate::controller::AsyncController;
use crate::state::OperationState;
use asyncstate_core::{Classify, NormalizedError};
use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// Runs an argument-less operation when its scope activates and whenever the
/// dependency value changes.
///
/// Dependencies are compared with `PartialEq`, so a freshly built `Vec` with
/// the same entries counts as unchanged.
///
/// # Example
///
/// ```
/// use asyncstate::Fetch;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut posts = Fetch::new(|| async { Ok::<_, String>(vec!["hello".to_string()]) });
///
/// let handle = posts.activate(vec![1]).expect("first activation fetches");
/// assert!(posts.activate(vec![1]).is_none());
///
/// handle.await.unwrap();
/// assert_eq!(posts.data(), Some(vec!["hello".to_string()]));
/// # }
/// ```
pub struct Fetch<D, T> {
    controller: AsyncController<(), T>,
    deps: Option<D>,
}

impl<D, T> Fetch<D, T>
where
    D: PartialEq,
    T: Clone + Send + Sync + 'static,
{
    /// Create a fetch wrapper
    pub fn new<F, Fut, E>(operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::with_options(operation, ControllerOptions::default())
    }

    /// Create a fetch wrapper with options
    pub fn with_options<F, Fut, E>(operation: F, options: ControllerOptions<T>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::from_controller(AsyncController::with_options(
            move |()| operation(),
            options,
        ))
    }

    /// Wrap an existing controller
    pub fn from_controller(controller: AsyncController<(), T>) -> Self {
        Self {
            controller,
            deps: None,
        }
    }

    /// Report the current dependencies for this render.
    ///
    /// Starts a fetch on the first call and whenever `deps` differs from the
    /// previous value, returning the spawned task. Returns `None` when nothing
    /// changed or the scope has ended. Must be called within a tokio runtime.
    pub fn activate(&mut self, deps: D) -> Option<JoinHandle<Option<T>>> {
        if !self.controller.is_mounted() {
            return None;
        }
        if self.deps.as_ref() == Some(&deps) {
            trace!(controller = ?self.controller.label(), "Dependencies unchanged");
            return None;
        }

        self.deps = Some(deps);
        Some(tokio::spawn(self.controller.execute(())))
    }

    /// Fetch again with the same dependencies
    pub fn refetch(&self) -> impl Future<Output = Option<T>> + Send + 'static {
        self.controller.execute(())
    }

    /// End the scope. Returns `true` if this call ended it.
    pub fn deactivate(&self) -> bool {
        self.controller.unmount()
    }

    /// Dependencies seen by the last fetch
    pub fn deps(&self) -> Option<&D> {
        self.deps.as_ref()
    }

    /// Current data
    pub fn data(&self) -> Option<T> {
        self.controller.data()
    }

    /// Whether a fetch is outstanding
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
    pub fn controller(&self) -> &AsyncController<(), T> {
        &self.controller
    }
}
