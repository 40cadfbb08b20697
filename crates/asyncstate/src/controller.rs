//! The async operation controller
//!
//! An [`AsyncController`] owns the state of one asynchronous operation and
//! guarantees that only the most recently started call can write to it. Older
//! calls still run to completion, but their outcome is dropped. Once the owning
//! scope ends, nothing is written at all.
//!
//! # Example
//!
//! ```
//! use asyncstate::AsyncController;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let controller = AsyncController::new(|id: u32| async move {
//!     Ok::<_, String>(format!("post {id}"))
//! });
//!
//! let pending = controller.execute(7);
//! assert!(controller.is_loading());
//!
//! assert_eq!(pending.await.as_deref(), Some("post 7"));
//! assert_eq!(controller.data().as_deref(), Some("post 7"));
//! assert!(!controller.is_loading());
//! # }
//! ```

use crate::config::ControllerOptions;
use crate::lifecycle::{MountFlag, ScopeGuard};
use crate::observability::{CallTimer, ControllerMetadata};
use crate::state::{CallToken, OperationState, Settlement};
use asyncstate_core::{Classify, NormalizedError, UNEXPECTED_ERROR_MESSAGE};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use uuid::Uuid;

/// Type-erased operation with classification already applied
type Operation<A, T> =
    Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, NormalizedError>> + Send + Sync>;

type RawOperation<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

type Classifier<E> = Arc<dyn Fn(&E) -> NormalizedError + Send + Sync>;

/// Shared per-instance record
struct Inner<A, T> {
    operation: Operation<A, T>,
    state: watch::Sender<OperationState<T>>,
    /// Highest issued token, 0 before the first call
    latest: AtomicU64,
    mount: MountFlag,
    options: ControllerOptions<T>,
    metadata: ControllerMetadata,
}

impl<A, T> Inner<A, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Issue a token and enter the loading state
    fn begin(&self) -> CallToken {
        let mut token = CallToken(0);
        let mut mounted = false;

        self.state.send_if_modified(|state| {
            token = CallToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
            mounted = self.mount.is_active();
            if !mounted {
                return false;
            }
            state.loading = true;
            state.error = None;
            true
        });

        self.metadata.log_issued(token, mounted);
        token
    }

    /// Write the outcome of `token` if it is still current and mounted
    fn apply(
        &self,
        token: CallToken,
        outcome: Result<T, NormalizedError>,
        timer: CallTimer,
    ) -> Settlement<T> {
        #[derive(Clone, Copy)]
        enum Guard {
            Current,
            Superseded,
            Detached,
        }

        let mut guard = Guard::Superseded;
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != token.0 {
                return false;
            }
            if !self.mount.is_active() {
                guard = Guard::Detached;
                return false;
            }
            guard = Guard::Current;
            state.loading = false;
            match &outcome {
                Ok(value) => {
                    state.data = Some(value.clone());
                    state.error = None;
                }
                Err(err) => {
                    state.data = None;
                    state.error = Some(err.clone());
                }
            }
            true
        });

        let settlement = match (guard, outcome) {
            (Guard::Current, Ok(value)) => {
                if let Some(callback) = &self.options.on_success {
                    callback(&value);
                }
                Settlement::Applied(value)
            }
            (Guard::Current, Err(err)) => {
                if let Some(callback) = &self.options.on_error {
                    callback(&err);
                }
                Settlement::Failed(err)
            }
            (Guard::Superseded, outcome) => Settlement::Superseded(outcome),
            (Guard::Detached, outcome) => Settlement::Detached(outcome),
        };

        self.metadata.log_settled(token, &settlement, timer.elapsed());
        settlement
    }
}

/// Controller for one asynchronous operation taking `A` and producing `T`.
///
/// Use `()` as `A` for argument-less operations and a tuple for several
/// arguments. Cloning the controller yields another handle to the same state.
pub struct AsyncController<A, T> {
    inner: Arc<Inner<A, T>>,
}

impl<A, T> Clone for AsyncController<A, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T> fmt::Debug for AsyncController<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncController")
            .field("id", &self.inner.metadata.id)
            .field("label", &self.inner.metadata.label)
            .field("latest", &self.inner.latest.load(Ordering::SeqCst))
            .field("mounted", &self.inner.mount.is_active())
            .finish()
    }
}

impl<A, T> AsyncController<A, T>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller whose error type knows how to classify itself
    pub fn new<F, Fut, E>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::builder(operation).build()
    }

    /// Create a controller with options
    pub fn with_options<F, Fut, E>(operation: F, options: ControllerOptions<T>) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        Self::builder(operation).options(options).build()
    }

    /// Start building a controller that classifies errors with [`Classify`]
    pub fn builder<F, Fut, E>(operation: F) -> ControllerBuilder<A, T, E>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Classify + Send + 'static,
    {
        ControllerBuilder::new(operation, |err: &E| err.classify())
    }

    fn from_parts(operation: Operation<A, T>, options: ControllerOptions<T>) -> Self {
        let (state, _) = watch::channel(OperationState::default());
        let metadata = ControllerMetadata::new(options.label.clone());
        Self {
            inner: Arc::new(Inner {
                operation,
                state,
                latest: AtomicU64::new(0),
                mount: MountFlag::new(),
                options,
                metadata,
            }),
        }
    }

    /// Run the operation.
    ///
    /// Before this returns, a new call token is issued, `loading` becomes
    /// `true`, any previous error is cleared and the operation is invoked.
    /// Existing data stays visible. The returned future resolves to the
    /// produced value on success, whether or not it was applied to state, and
    /// to `None` on failure. It never panics on operation failure.
    ///
    /// The call runs on its own task, so the outcome is applied even if the
    /// returned future is dropped. Must be called within a tokio runtime.
    pub fn execute(&self, args: A) -> impl Future<Output = Option<T>> + Send + 'static {
        let settlement = self.settle(args);
        async move { settlement.await.into_value() }
    }

    /// Run the operation and report how it settled.
    ///
    /// Same call semantics as [`execute`](Self::execute). A panicking
    /// operation settles as a generic failure.
    pub fn settle(&self, args: A) -> impl Future<Output = Settlement<T>> + Send + 'static {
        let timer = CallTimer::start();
        let token = self.inner.begin();
        let call = (self.inner.operation)(args);
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(call)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(NormalizedError::generic(UNEXPECTED_ERROR_MESSAGE)));
            inner.apply(token, outcome, timer)
        });

        async move {
            // Only a panicking callback or runtime shutdown gets here
            task.await.unwrap_or_else(|err| {
                Settlement::Detached(Err(NormalizedError::generic(err.to_string())))
            })
        }
    }

    /// Replace the whole state with the default.
    ///
    /// Not guarded by the call token or the mount flag. A call still in flight
    /// may apply its outcome afterwards.
    pub fn reset(&self) {
        self.inner.state.send_replace(OperationState::default());
        self.inner.metadata.log_reset();
    }

    /// Replace only `data`
    pub fn set_data(&self, data: Option<T>) {
        self.inner.state.send_modify(|state| state.data = data);
    }

    /// Snapshot of the current state
    pub fn state(&self) -> OperationState<T> {
        self.inner.state.borrow().clone()
    }

    /// Current data
    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Whether the latest call is outstanding
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Current error
    pub fn error(&self) -> Option<NormalizedError> {
        self.inner.state.borrow().error.clone()
    }

    /// Message of the current error
    pub fn error_message(&self) -> Option<String> {
        self.inner.state.borrow().error_message()
    }

    /// Whether data is present and no error is
    pub fn is_success(&self) -> bool {
        self.inner.state.borrow().is_success()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.inner.state.subscribe()
    }

    /// Token of the most recently started call
    pub fn latest_token(&self) -> Option<CallToken> {
        match self.inner.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(CallToken(n)),
        }
    }

    /// Whether the owning scope is still active
    pub fn is_mounted(&self) -> bool {
        self.inner.mount.is_active()
    }

    /// End the owning scope.
    ///
    /// Returns `true` if this call ended it. The state is frozen as is.
    pub fn unmount(&self) -> bool {
        let mut ended = false;
        let mut in_flight = false;
        self.inner.state.send_if_modified(|state| {
            ended = self.inner.mount.teardown();
            in_flight = state.loading;
            false
        });

        if ended {
            self.inner.metadata.log_teardown(in_flight);
        }
        ended
    }

    /// Guard that ends the owning scope when dropped
    pub fn scope_guard(&self) -> ScopeGuard {
        let controller = self.clone();
        ScopeGuard::new(move || {
            controller.unmount();
        })
    }

    /// Instance id used in log fields
    pub fn id(&self) -> Uuid {
        self.inner.metadata.id
    }

    /// Configured label
    pub fn label(&self) -> Option<&str> {
        self.inner.metadata.label.as_deref()
    }
}

/// Builder for [`AsyncController`]
pub struct ControllerBuilder<A, T, E> {
    operation: RawOperation<A, T, E>,
    classifier: Classifier<E>,
    options: ControllerOptions<T>,
}

impl<A, T, E> ControllerBuilder<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Create a builder with an explicit classifier
    pub fn new<F, Fut, C>(operation: F, classifier: C) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        C: Fn(&E) -> NormalizedError + Send + Sync + 'static,
    {
        Self {
            operation: Arc::new(move |args| operation(args).boxed()),
            classifier: Arc::new(classifier),
            options: ControllerOptions::default(),
        }
    }

    /// Replace the classifier
    pub fn classify_with<C>(mut self, classifier: C) -> Self
    where
        C: Fn(&E) -> NormalizedError + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Replace all options
    pub fn options(mut self, options: ControllerOptions<T>) -> Self {
        self.options = options;
        self
    }

    /// Set the label used in log fields
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.options.label = Some(label.into());
        self
    }

    /// Set the success callback
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.options = self.options.on_success(callback);
        self
    }

    /// Set the failure callback
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NormalizedError) + Send + Sync + 'static,
    {
        self.options = self.options.on_error(callback);
        self
    }

    /// Build the controller
    pub fn build(self) -> AsyncController<A, T> {
        let Self {
            operation,
            classifier,
            options,
        } = self;

        let classified: Operation<A, T> = Arc::new(move |args| {
            let call = operation(args);
            let classifier = Arc::clone(&classifier);
            async move { call.await.map_err(|err| classifier(&err)) }.boxed()
        });

        AsyncController::from_parts(classified, options)
    }
}

impl<A, T, E> fmt::Debug for ControllerBuilder<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("options", &self.options)
            .finish()
    }
}
