//! Wrappers specialising the controller for common interaction patterns
//!
//! - [`Fetch`] runs an argument-less read when its scope activates and again
//!   whenever its dependencies change
//! - [`Mutation`] runs user-triggered writes
//! - [`FormSubmission`] runs form submits and tracks per-field errors

pub mod fetch;
pub mod form;
pub mod mutation;

pub use fetch::Fetch;
pub use form::{FormSubmission, FormSubmissionBuilder};
pub use mutation::Mutation;
