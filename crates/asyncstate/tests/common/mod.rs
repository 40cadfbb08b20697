//! In-memory posts backend for integration tests
//!
//! Simulates latency and failure injection so tests can drive controllers
//! without a real HTTP client.

#![allow(dead_code)]

use asyncstate::{ApiError, ValidationError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u32,
    pub title: String,
}

/// Fake backend with queued failures and configurable latency
#[derive(Clone, Default)]
pub struct FakeApi {
    posts: Arc<Mutex<Vec<Post>>>,
    failures: Arc<Mutex<VecDeque<ApiError>>>,
    calls: Arc<AtomicU32>,
    latency: Duration,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_posts(self, titles: &[&str]) -> Self {
        {
            let mut posts = self.posts.lock().unwrap();
            for title in titles {
                let id = posts.len() as u32 + 1;
                posts.push(Post {
                    id,
                    title: title.to_string(),
                });
            }
        }
        self
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn roundtrip(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub async fn list_posts(self) -> Result<Vec<Post>, ApiError> {
        self.roundtrip().await?;
        Ok(self.posts.lock().unwrap().clone())
    }

    pub async fn create_post(self, title: String) -> Result<Post, ApiError> {
        self.roundtrip().await?;
        if title.trim().is_empty() {
            return Err(ApiError::UnprocessableEntity {
                message: "Invalid input".to_string(),
                code: Some("VALIDATION_ERROR".to_string()),
                errors: vec![ValidationError::new("title", "Title is required")],
            });
        }

        let mut posts = self.posts.lock().unwrap();
        let post = Post {
            id: posts.len() as u32 + 1,
            title,
        };
        posts.push(post.clone());
        Ok(post)
    }
}
