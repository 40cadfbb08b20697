//! Integration tests for the wrappers against a fake backend

mod common;

use asyncstate::prelude::*;
use common::{FakeApi, Post};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn test_feed_fetches_and_renders() {
    common::init_tracing();
    let api = FakeApi::new().with_posts(&["Hello", "World"]);
    let source = api.clone();
    let mut feed = Fetch::new(move || source.clone().list_posts());

    feed.activate(("rust", 1)).unwrap().await.unwrap();

    let state = feed.state();
    let rendered = AsyncState::from_state(&state).render(|posts| {
        posts
            .iter()
            .map(|p| p.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    });
    assert_eq!(rendered.to_string(), "Hello, World");
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_feed_with_no_posts_renders_empty() {
    let api = FakeApi::new();
    let mut feed = Fetch::new(move || api.clone().list_posts());

    feed.activate(()).unwrap().await.unwrap();

    let state = feed.state();
    let config = PresentationConfig::new().with_empty("No posts yet", None);
    let rendered = AsyncState::from_state(&state)
        .config(&config)
        .render(|posts| posts.len());
    assert_eq!(rendered.to_string(), "No posts yet");
}

#[tokio::test]
async fn test_feed_network_failure_then_refetch() {
    let api = FakeApi::new().with_posts(&["Hello"]);
    api.fail_next(ApiError::Connection("connection refused".to_string()));
    let source = api.clone();
    let mut feed = Fetch::new(move || source.clone().list_posts());

    feed.activate(1u32).unwrap().await.unwrap();
    let error = feed.error().unwrap();
    assert!(error.is_network_error());
    assert_eq!(error.code(), Some("NETWORK_ERROR"));

    let posts = feed.refetch().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert!(feed.error().is_none());
}

#[tokio::test]
async fn test_feed_dependency_change_refetches() {
    let api = FakeApi::new().with_posts(&["Hello"]);
    let source = api.clone();
    let mut feed = Fetch::new(move || source.clone().list_posts());

    feed.activate(vec![1]).unwrap().await.unwrap();
    assert!(feed.activate(vec![1]).is_none());
    feed.activate(vec![2]).unwrap().await.unwrap();

    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_create_post_mutation_and_server_errors() {
    let api = FakeApi::new();
    let backend = api.clone();
    let create = Mutation::new(move |title: String| backend.clone().create_post(title));

    let post = create.mutate("First".to_string()).await;
    assert_eq!(
        post,
        Some(Post {
            id: 1,
            title: "First".to_string()
        })
    );
    assert!(create.is_success());

    api.fail_next(ApiError::from_response(
        410,
        r#"{"message": "Feed was archived", "code": "FEED_ARCHIVED"}"#,
    ));
    assert_eq!(create.mutate("Second".to_string()).await, None);
    assert!(!create.is_success());

    let error = create.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::Generic);
    assert_eq!(error.message(), "Feed was archived");
    assert_eq!(error.code(), Some("FEED_ARCHIVED"));
    assert_eq!(error.status(), Some(410));

    api.fail_next(ApiError::from_response(503, "upstream unavailable"));
    create.mutate("Third".to_string()).await;
    assert_eq!(create.error_message().as_deref(), Some("upstream unavailable"));
    assert_eq!(create.error().and_then(|e| e.status()), Some(503));
}

#[tokio::test]
async fn test_form_collects_and_clears_field_errors() {
    let api = FakeApi::new();
    let backend = api.clone();
    let created = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&created);

    let form = FormSubmission::builder(move |title: String| backend.clone().create_post(title))
        .label("new-post")
        .on_success(move |post: &Post| record.lock().unwrap().push(post.id))
        .build();

    form.submit("   ".to_string()).await;
    assert_eq!(
        form.field_error("title").as_deref(),
        Some("Title is required")
    );
    assert_eq!(form.error().map(|e| e.kind()), Some(ErrorKind::Validation));

    let state = form.state();
    let rendered = AsyncState::with_empty_check(
        state.loading,
        state.error.as_ref(),
        state.data.as_ref(),
        |_: &Post| false,
    )
    .retryable(true)
    .render(|post| post.title.clone());
    match rendered {
        Rendered::Error(view) => {
            assert_eq!(view.field_errors, form.field_errors());
            assert!(view.retryable);
        }
        other => panic!("expected error view, got {}", other.name()),
    }

    assert!(form.clear_field_error("title"));
    form.submit("Fixed".to_string()).await;
    assert!(form.is_success());
    assert_eq!(*created.lock().unwrap(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_form_submit_clears_field_errors_before_response() {
    let api = FakeApi::new().with_latency(Duration::from_millis(100));
    let backend = api.clone();
    let form = FormSubmission::new(move |title: String| backend.clone().create_post(title));

    form.submit(String::new()).await;
    assert!(form.has_field_errors());

    let pending = tokio::spawn(form.submit("ok".to_string()));
    assert!(!form.has_field_errors());
    assert!(form.is_loading());

    assert!(pending.await.unwrap().is_some());
    assert!(!form.is_loading());
}

#[tokio::test]
async fn test_anyhow_and_io_errors_classify() {
    let failing = Mutation::new(|_: ()| async {
        Err::<(), _>(anyhow::anyhow!("disk quota exceeded"))
    });
    failing.mutate(()).await;
    assert_eq!(failing.error_message().as_deref(), Some("disk quota exceeded"));

    let offline = Mutation::new(|_: ()| async {
        Err::<(), _>(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
    });
    offline.mutate(()).await;
    assert!(offline.error().unwrap().is_network_error());
}
