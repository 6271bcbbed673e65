mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{MemoryRepo, RecordingMailer, subscriber};
use newsletter::{AppState, SubscriberService};
use tower::ServiceExt;

fn app(repo: MemoryRepo) -> Router {
    let service = SubscriberService::new(repo, RecordingMailer::default());
    newsletter::http::router(Arc::new(AppState::new(service, "1.2.3")))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn version_returns_text() {
    let response = app(MemoryRepo::default())
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"1.2.3\n");
}

#[tokio::test]
async fn list_subscribers() {
    let response = app(MemoryRepo::with(vec![subscriber("a@b.co", "A", true)]))
        .oneshot(Request::builder().uri("/subscribers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body[0]["email"], "a@b.co");
    assert_eq!(body[0]["isSubscribed"], true);
}

#[tokio::test]
async fn empty_list_is_404_in_requested_language() {
    let app = app(MemoryRepo::default());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/subscribers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json(response).await;
    assert_eq!(body["code"], "DATA_NOT_FOUND");
    assert_eq!(body["message"], "Data not found");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/subscribers")
                .header(header::ACCEPT_LANGUAGE, "th")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json(response).await["message"], "ไม่พบข้อมูล");
}

#[tokio::test]
async fn subscribe_success() {
    let response = app(MemoryRepo::default())
        .oneshot(post_json("/subscribe", r#"{"email":"a@b.co","name":"A"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["body"], "subscribe success");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let response = app(MemoryRepo::default())
        .oneshot(post_json("/subscribe", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn invalid_email_is_400() {
    let response = app(MemoryRepo::default())
        .oneshot(post_json("/subscribe", r#"{"email":"nope","name":"A"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsubscribe_known_and_unknown() {
    let app = app(MemoryRepo::with(vec![subscriber("a@b.co", "A", true)]));

    let response = app
        .clone()
        .oneshot(post_json("/unsubscribe", r#"{"email":"a@b.co"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["body"], "unsubscribe success");

    let response = app
        .oneshot(post_json("/unsubscribe", r#"{"email":"x@y.co"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_failure_is_500() {
    let response = app(MemoryRepo::failing_reads())
        .oneshot(Request::builder().uri("/subscribers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(response).await;
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn regional_thai_header_selects_thai() {
    let response = app(MemoryRepo::default())
        .oneshot(
            Request::builder()
                .uri("/subscribers")
                .header(header::ACCEPT_LANGUAGE, "th-TH,th;q=0.9,en;q=0.8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["message"], "ไม่พบข้อมูล");
}
