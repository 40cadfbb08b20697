//! Presentation contract
//!
//! Selects exactly one of four renderings from `{loading, error, data}`, in
//! fixed priority:
//!
//! 1. loading, even when stale data or an error is present
//! 2. error
//! 3. empty, when the data is absent or the emptiness check says so
//! 4. content
//!
//! # Example
//!
//! ```
//! use asyncstate::presentation::{AsyncState, Rendered};
//!
//! let posts = vec!["First post".to_string()];
//! let rendered = AsyncState::new(false, None, Some(&posts)).render(|posts| posts.join("\n"));
//!
//! assert_eq!(rendered, Rendered::Content("First post".to_string()));
//! ```

pub mod empty;
pub mod views;

pub use empty::IsEmpty;
pub use views::{EmptyState, ErrorState, LoadingState};

use crate::config::PresentationConfig;
use crate::state::OperationState;
use asyncstate_core::NormalizedError;
use std::fmt;

/// Which rendering applies, borrowing the data it needs
#[derive(Debug, PartialEq)]
pub enum View<'a, T: ?Sized> {
    /// An operation is outstanding
    Loading,
    /// The latest operation failed
    Error(&'a NormalizedError),
    /// Nothing to show
    Empty,
    /// Non-empty data to show
    Content(&'a T),
}

impl<T: ?Sized> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for View<'_, T> {}

impl<T: ?Sized> View<'_, T> {
    /// Short name of the rendering
    pub fn name(&self) -> &'static str {
        match self {
            View::Loading => "loading",
            View::Error(_) => "error",
            View::Empty => "empty",
            View::Content(_) => "content",
        }
    }
}

/// Choose the rendering for `{loading, error, data}`
pub fn select_view<'a, T, P>(
    loading: bool,
    error: Option<&'a NormalizedError>,
    data: Option<&'a T>,
    is_empty: P,
) -> View<'a, T>
where
    T: ?Sized,
    P: FnOnce(&T) -> bool,
{
    if loading {
        return View::Loading;
    }
    if let Some(error) = error {
        return View::Error(error);
    }
    match data {
        Some(data) if !is_empty(data) => View::Content(data),
        _ => View::Empty,
    }
}

/// One of the four renderings with its props
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<R> {
    /// Loading indicator
    Loading(LoadingState),
    /// Error panel
    Error(ErrorState),
    /// Empty placeholder
    Empty(EmptyState),
    /// Output of the content function
    Content(R),
}

impl<R> Rendered<R> {
    /// Short name of the rendering
    pub fn name(&self) -> &'static str {
        match self {
            Rendered::Loading(_) => "loading",
            Rendered::Error(_) => "error",
            Rendered::Empty(_) => "empty",
            Rendered::Content(_) => "content",
        }
    }

    /// Content output, if content was rendered
    pub fn content(self) -> Option<R> {
        match self {
            Rendered::Content(content) => Some(content),
            _ => None,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Rendered<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Loading(view) => view.fmt(f),
            Rendered::Error(view) => view.fmt(f),
            Rendered::Empty(view) => view.fmt(f),
            Rendered::Content(content) => content.fmt(f),
        }
    }
}

type EmptyCheck<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Builder over borrowed controller state that renders one view
pub struct AsyncState<'a, T> {
    loading: bool,
    error: Option<&'a NormalizedError>,
    data: Option<&'a T>,
    is_empty: EmptyCheck<'a, T>,
    retryable: bool,
    config: Option<&'a PresentationConfig>,
}

impl<'a, T: IsEmpty> AsyncState<'a, T> {
    /// Presentation over explicit fields, using [`IsEmpty`]
    pub fn new(loading: bool, error: Option<&'a NormalizedError>, data: Option<&'a T>) -> Self {
        Self::with_empty_check(loading, error, data, |data: &T| data.is_empty_value())
    }

    /// Presentation over a controller state snapshot
    pub fn from_state(state: &'a OperationState<T>) -> Self {
        Self::new(state.loading, state.error.as_ref(), state.data.as_ref())
    }
}

impl<'a, T> AsyncState<'a, T> {
    /// Presentation with a custom emptiness check, for data without [`IsEmpty`]
    pub fn with_empty_check<P>(
        loading: bool,
        error: Option<&'a NormalizedError>,
        data: Option<&'a T>,
        is_empty: P,
    ) -> Self
    where
        P: Fn(&T) -> bool + 'a,
    {
        Self {
            loading,
            error,
            data,
            is_empty: Box::new(is_empty),
            retryable: false,
            config: None,
        }
    }

    /// Replace the emptiness check
    pub fn empty_when<P>(mut self, is_empty: P) -> Self
    where
        P: Fn(&T) -> bool + 'a,
    {
        self.is_empty = Box::new(is_empty);
        self
    }

    /// Offer a retry action on the error view
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Use custom copy
    pub fn config(mut self, config: &'a PresentationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Which rendering applies
    pub fn view(&self) -> View<'a, T> {
        select_view(self.loading, self.error, self.data, |data| {
            (self.is_empty)(data)
        })
    }

    /// Render the selected view, calling `content` only for non-empty data
    pub fn render<R, C>(self, content: C) -> Rendered<R>
    where
        C: FnOnce(&T) -> R,
    {
        let default_config;
        let config = match self.config {
            Some(config) => config,
            None => {
                default_config = PresentationConfig::default();
                &default_config
            }
        };

        match self.view() {
            View::Loading => Rendered::Loading(LoadingState::from_config(config)),
            View::Error(error) => Rendered::Error(ErrorState::new(error, config, self.retryable)),
            View::Empty => Rendered::Empty(EmptyState::from_config(config)),
            View::Content(data) => Rendered::Content(content(data)),
        }
    }
}

impl<T> fmt::Debug for AsyncState<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncState")
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("has_data", &self.data.is_some())
            .field("retryable", &self.retryable)
            .finish()
    }
}
