#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # asyncstate
//!
//! State management for asynchronous operations driven by a UI whose scopes
//! can end while requests are still in flight.
//!
//! - **Latest call wins**: only the most recently started call may write
//!   state; older calls finish in the background and are ignored
//! - **Scope-aware**: once a scope ends, late completions change nothing
//! - **Failures are values**: errors are classified into a
//!   [`NormalizedError`] and stored, never thrown
//! - **Wrappers** for fetch-on-activation, mutations and form submissions
//! - **Presentation contract** choosing between loading, error, empty and
//!   content renderings
//!
//! ## Quick Start
//!
//! ```rust
//! use asyncstate::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let like = Mutation::new(|post_id: u32| async move {
//!     if post_id == 0 {
//!         Err(ApiError::NotFound {
//!             message: "post 0".to_string(),
//!             code: None,
//!         })
//!     } else {
//!         Ok(post_id)
//!     }
//! });
//!
//! like.mutate(0).await;
//! let state = like.state();
//! let rendered = AsyncState::from_state(&state).render(|id| format!("liked {id}"));
//!
//! assert_eq!(rendered.name(), "error");
//! # }
//! ```
//!
//! ## Logging
//!
//! Controllers emit `tracing` events with `controller`, `controller_id` and
//! `token` fields. No subscriber is installed by this crate.

pub mod config;
pub mod controller;
pub mod hooks;
pub mod lifecycle;
pub mod observability;
pub mod presentation;
pub mod state;

pub use asyncstate_core::{
    ApiError, Classify, ErrorKind, FieldErrors, NormalizedError, ValidationError,
};
pub use config::{ControllerOptions, PresentationConfig};
pub use controller::{AsyncController, ControllerBuilder};
pub use hooks::{Fetch, FormSubmission, FormSubmissionBuilder, Mutation};
pub use lifecycle::{MountFlag, ScopeGuard};
pub use presentation::{
    AsyncState, EmptyState, ErrorState, IsEmpty, LoadingState, Rendered, View, select_view,
};
pub use state::{CallToken, OperationState, Settlement};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use asyncstate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ControllerOptions, PresentationConfig};
    pub use crate::controller::AsyncController;
    pub use crate::hooks::{Fetch, FormSubmission, Mutation};
    pub use crate::presentation::{AsyncState, IsEmpty, Rendered, View};
    pub use crate::state::{OperationState, Settlement};
    pub use asyncstate_core::prelude::*;
}
