//! Authentication integration tests.
//!
//! Tests verify:
//! - A valid bearer token is accepted
//! - Missing, malformed and wrong tokens are rejected with 401
//! - Rejected requests never touch the filesystem or the transcoder
//! - The health check needs no token

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::test_utils::{
    bearer, convert_request, test_router, MockTranscoder, MultipartBuilder, TestWorkspace,
    TEST_TOKEN,
};

fn upload_body() -> (String, Vec<u8>) {
    MultipartBuilder::new()
        .file("file", "clip.mp4", b"some media bytes")
        .build()
}

async fn error_message(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    error["error"].as_str().unwrap().to_string()
}

// =============================================================================
// Valid Tokens
// =============================================================================

#[tokio::test]
async fn test_valid_token_succeeds() {
    let workspace = TestWorkspace::new();
    let transcoder = MockTranscoder::producing(b"converted");
    let router = test_router(transcoder.clone(), &workspace);

    let (content_type, body) = upload_body();
    let response = router
        .oneshot(convert_request(Some(&bearer(TEST_TOKEN)), &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"converted");
    assert_eq!(transcoder.call_count(), 1);
}

#[tokio::test]
async fn test_token_surrounding_whitespace_is_ignored() {
    let workspace = TestWorkspace::new();
    let router = test_router(MockTranscoder::producing(b"converted"), &workspace);

    let (content_type, body) = upload_body();
    let header_value = format!("Bearer   {}  ", TEST_TOKEN);
    let response = router
        .oneshot(convert_request(Some(&header_value), &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Missing or Malformed Header
// =============================================================================

#[tokio::test]
async fn test_missing_header_rejected() {
    let workspace = TestWorkspace::new();
    let transcoder = MockTranscoder::producing(b"converted");
    let router = test_router(transcoder.clone(), &workspace);

    let (content_type, body) = upload_body();
    let response = router
        .oneshot(convert_request(None, &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(response).await,
        "Unauthorized: token ausente ou inválido"
    );
    assert_eq!(transcoder.call_count(), 0);
    assert!(!workspace.dirs_exist());
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let workspace = TestWorkspace::new();
    let transcoder = MockTranscoder::producing(b"converted");
    let router = test_router(transcoder.clone(), &workspace);

    let (content_type, body) = upload_body();
    let header_value = format!("Basic {}", TEST_TOKEN);
    let response = router
        .oneshot(convert_request(Some(&header_value), &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(response).await,
        "Unauthorized: token ausente ou inválido"
    );
    assert_eq!(transcoder.call_count(), 0);
}

#[tokio::test]
async fn test_lowercase_scheme_rejected() {
    let workspace = TestWorkspace::new();
    let router = test_router(MockTranscoder::producing(b"converted"), &workspace);

    let (content_type, body) = upload_body();
    let header_value = format!("bearer {}", TEST_TOKEN);
    let response = router
        .oneshot(convert_request(Some(&header_value), &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Wrong Token
// =============================================================================

#[tokio::test]
async fn test_wrong_token_rejected() {
    let workspace = TestWorkspace::new();
    let transcoder = MockTranscoder::producing(b"converted");
    let router = test_router(transcoder.clone(), &workspace);

    let (content_type, body) = upload_body();
    let response = router
        .oneshot(convert_request(
            Some(&bearer("not-the-token")),
            &content_type,
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(error_message(response).await, "Unauthorized: token inválido");
    assert_eq!(transcoder.call_count(), 0);
    assert!(!workspace.dirs_exist());
}

#[tokio::test]
async fn test_empty_bearer_token_rejected() {
    let workspace = TestWorkspace::new();
    let router = test_router(MockTranscoder::producing(b"converted"), &workspace);

    let (content_type, body) = upload_body();
    let response = router
        .oneshot(convert_request(Some("Bearer "), &content_type, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_runs_before_body_is_read() {
    let workspace = TestWorkspace::new();
    let transcoder = MockTranscoder::producing(b"converted");
    let router = test_router(transcoder.clone(), &workspace);

    // Not multipart at all; auth must still answer first
    let response = router
        .oneshot(convert_request(
            Some(&bearer("wrong")),
            "text/plain",
            b"hello".to_vec(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(transcoder.call_count(), 0);
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let workspace = TestWorkspace::new();
    let router = test_router(MockTranscoder::producing(b"converted"), &workspace);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
