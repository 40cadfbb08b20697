//! HTTP error envelopes flowing through controllers into rendered views

use asyncstate::presentation::{AsyncState, Rendered};
use asyncstate::{FormSubmission, Mutation, PresentationConfig};
use asyncstate_core::{ApiError, ErrorKind, NETWORK_ERROR_MESSAGE};
use rstest::rstest;
use serde_json::json;

fn failing_mutation(status: u16, body: String) -> Mutation<(), Vec<String>> {
    Mutation::new(move |_: ()| {
        let error = ApiError::from_response(status, &body);
        async move { Err::<Vec<String>, _>(error) }
    })
}

#[rstest]
#[case::bad_request_with_fields(
    400,
    json!({"message": "Invalid input", "errors": [{"field": "email", "message": "invalid"}]}),
    ErrorKind::Validation,
    "Invalid input"
)]
#[case::unprocessable_map_errors(
    422,
    json!({"errors": {"password": "too short"}}),
    ErrorKind::Validation,
    "too short"
)]
#[case::not_found(404, json!({"message": "Quiz not found"}), ErrorKind::Generic, "Quiz not found")]
#[case::conflict(409, json!({"message": "Email taken"}), ErrorKind::Generic, "Email taken")]
#[case::server_error(500, json!({}), ErrorKind::Generic, "The server encountered an error")]
#[tokio::test]
async fn test_response_classification(
    #[case] status: u16,
    #[case] body: serde_json::Value,
    #[case] kind: ErrorKind,
    #[case] message: &str,
) {
    let mutation = failing_mutation(status, body.to_string());
    assert_eq!(mutation.mutate(()).await, None);

    let error = mutation.error().expect("failure is stored");
    assert_eq!(error.kind(), kind);
    assert_eq!(error.message(), message);
    assert_eq!(error.field_errors().is_some(), kind == ErrorKind::Validation);
}

#[tokio::test]
async fn test_network_error_renders_connection_copy() {
    let mutation: Mutation<(), Vec<String>> = Mutation::new(|_: ()| async {
        Err::<Vec<String>, _>(ApiError::Timeout { after: None })
    });
    mutation.mutate(()).await;

    let state = mutation.state();
    let rendered = AsyncState::from_state(&state)
        .retryable(true)
        .render(|items| items.len());

    match rendered {
        Rendered::Error(view) => {
            assert_eq!(view.kind, ErrorKind::Network);
            assert_eq!(view.title, PresentationConfig::default().network_error_title);
            assert_eq!(view.message, NETWORK_ERROR_MESSAGE);
        }
        other => panic!("expected error view, got {}", other.name()),
    }
    assert_eq!(
        mutation.error().and_then(|e| e.code().map(String::from)),
        Some("TIMEOUT".to_string())
    );
}

#[tokio::test]
async fn test_form_field_errors_from_envelope() {
    let body = json!({
        "message": "Invalid input",
        "code": "SIGNUP_INVALID",
        "errors": [
            {"path": "email", "msg": "invalid"},
            {"param": "age", "message": "must be positive"}
        ]
    })
    .to_string();

    let form = FormSubmission::new(move |_: String| {
        let error = ApiError::from_response(422, &body);
        async move { Err::<(), _>(error) }
    });

    form.submit("ada@example.com".to_string()).await;
    assert_eq!(form.field_error("email").as_deref(), Some("invalid"));
    assert_eq!(form.field_error("age").as_deref(), Some("must be positive"));
    assert_eq!(
        form.error().and_then(|e| e.code().map(String::from)),
        Some("SIGNUP_INVALID".to_string())
    );

    assert!(form.clear_field_error("email"));
    assert_eq!(form.field_errors().len(), 1);
}
