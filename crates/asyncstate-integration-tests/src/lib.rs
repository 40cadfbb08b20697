//! Integration tests for the asyncstate workspace
//!
//! Exercises the controller crate and the error-model crate together:
//! completion-order properties and HTTP error envelopes flowing through to
//! the presentation layer.

#[cfg(test)]
mod completion_order;

#[cfg(test)]
mod error_flow;
