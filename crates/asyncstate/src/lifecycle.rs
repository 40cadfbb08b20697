//! Scope lifecycle with RAII teardown
//!
//! Provides:
//! - `MountFlag`, the one-way "scope is still active" switch a controller checks
//!   before every state write
//! - `ScopeGuard`, which ends a scope automatically when dropped
//!
//! # Example
//!
//! ```
//! use asyncstate::AsyncController;
//!
//! let controller = AsyncController::new(|n: u32| async move { Ok::<_, String>(n * 2) });
//! {
//!     let _guard = controller.scope_guard();
//!     // ... render while the scope is active ...
//! } // Scope ends here; late completions are dropped
//!
//! assert!(!controller.is_mounted());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the owning scope is still active.
///
/// Starts active and transitions to inactive exactly once. Clones share the
/// same flag.
#[derive(Debug, Clone)]
pub struct MountFlag {
    active: Arc<AtomicBool>,
}

impl MountFlag {
    /// Create an active flag
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the scope is still active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// End the scope.
    ///
    /// Returns `true` only for the call that performed the transition; later
    /// calls are no-ops.
    pub fn teardown(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that ends a scope when dropped
///
/// Ensures late completions are ignored even if the owner returns early or
/// unwinds.
pub struct ScopeGuard {
    // Boxed so guards for different controller types share one type
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl ScopeGuard {
    /// Create a new guard with a teardown function
    pub fn new<F>(on_drop: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Consume the guard without ending the scope
    pub fn disarm(mut self) {
        self.on_drop.take();
    }

    /// End the scope now and consume the guard
    pub fn teardown(mut self) {
        if let Some(teardown) = self.on_drop.take() {
            teardown();
        }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(teardown) = self.on_drop.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("armed", &self.on_drop.is_some())
            .finish()
    }
}
