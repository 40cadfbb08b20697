//! Posts feed rendered as plain text
//!
//! Drives the fetch, mutation and form wrappers against an in-memory backend
//! and prints what a UI would show after each step.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=asyncstate=debug cargo run --example posts_feed
//! ```

use asyncstate::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Post {
    id: u32,
    title: String,
    likes: u32,
}

#[derive(Clone, Default)]
struct Backend {
    posts: Arc<Mutex<Vec<Post>>>,
    offline: Arc<Mutex<bool>>,
}

impl Backend {
    fn check_connection(&self) -> Result<(), ApiError> {
        if *self.offline.lock().unwrap() {
            return Err(ApiError::Connection("connection refused".to_string()));
        }
        Ok(())
    }

    async fn list(self) -> Result<Vec<Post>, ApiError> {
        tokio::time::sleep(Duration::from_millis(80)).await;
        self.check_connection()?;
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn like(self, id: u32) -> Result<Post, ApiError> {
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.check_connection()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound {
                message: format!("Post {id} not found"),
                code: None,
            })?;
        post.likes += 1;
        Ok(post.clone())
    }

    async fn create(self, title: String) -> Result<Post, ApiError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.check_connection()?;
        if title.trim().len() < 3 {
            return Err(ApiError::from_response(
                422,
                r#"{"message": "Invalid input", "errors": [{"field": "title", "message": "Title must be at least 3 characters"}]}"#,
            ));
        }
        let mut posts = self.posts.lock().unwrap();
        let post = Post {
            id: posts.len() as u32 + 1,
            title,
            likes: 0,
        };
        posts.push(post.clone());
        Ok(post)
    }
}

fn render_feed(feed: &Fetch<u32, Vec<Post>>, config: &PresentationConfig) -> String {
    let state = feed.state();
    AsyncState::from_state(&state)
        .config(config)
        .retryable(true)
        .render(|posts| {
            posts
                .iter()
                .map(|p| format!("#{} {} ({} likes)", p.id, p.title, p.likes))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let backend = Backend::default();
    let config = PresentationConfig::new()
        .with_loading_message("Loading posts...")
        .with_empty("No posts yet", Some("Be the first to write one".to_string()));

    let source = backend.clone();
    let mut feed = Fetch::new(move || source.clone().list());
    let page = 1u32;

    println!("== Initial load ==");
    let initial = feed.activate(page);
    println!("{}\n", render_feed(&feed, &config));
    if let Some(handle) = initial {
        handle.await?;
    }
    println!("{}\n", render_feed(&feed, &config));

    println!("== Create post with invalid title ==");
    let writer = backend.clone();
    let form = FormSubmission::builder(move |title: String| writer.clone().create(title))
        .label("new-post")
        .on_success(|post| println!("created post #{}", post.id))
        .build();
    form.submit("Hi".to_string()).await;
    for (field, message) in form.field_errors() {
        println!("{field}: {message}");
    }
    form.clear_field_error("title");

    println!("\n== Create post ==");
    form.submit("Learning Rust ownership".to_string()).await;
    feed.refetch().await;
    println!("{}\n", render_feed(&feed, &config));

    println!("== Like twice quickly ==");
    let liker = backend.clone();
    let like = Mutation::new(move |id: u32| liker.clone().like(id));
    let first = like.mutate(1);
    let second = like.mutate(1);
    let (a, b) = tokio::join!(first, second);
    println!(
        "first call returned {:?}, second returned {:?}, state shows {:?} likes",
        a.map(|p| p.likes),
        b.map(|p| p.likes),
        like.data().map(|p| p.likes)
    );

    println!("\n== Go offline and refetch ==");
    *backend.offline.lock().unwrap() = true;
    feed.refetch().await;
    println!("{}\n", render_feed(&feed, &config));

    feed.deactivate();
    Ok(())
}
