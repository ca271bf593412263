//! HTTP surface of the comment pipeline: the submission transport and the
//! rendering consumer endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use integration_tests::{app_state, approved_comment, seeded_store};
use storage_adapters::MemoryStore;
use uuid::Uuid;

fn app(cooldown: Duration) -> (Router, Arc<MemoryStore>, Uuid) {
    let (store, post_id) = seeded_store();
    let router = api_adapters::router(app_state(store.clone(), cooldown));
    (router, store, post_id)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let mut request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    // `axum::serve` would inject this; oneshot calls have to do it by hand.
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn submission(post_id: Uuid) -> Value {
    json!({
        "post_id": post_id,
        "author_name": "Maria Silva",
        "author_email": "maria@example.com",
        "content": "Qual a taxa no débito?",
    })
}

#[tokio::test]
async fn submitting_a_comment_returns_pending() {
    let (router, store, post_id) = app(Duration::from_secs(30));

    let response = router
        .oneshot(request("POST", "/api/comments", Some(submission(post_id))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "pending" }));
    assert_eq!(store.all_comments().len(), 1);
}

#[tokio::test]
async fn validation_errors_come_back_per_field() {
    let (router, store, post_id) = app(Duration::from_secs(30));

    let body = json!({
        "post_id": post_id,
        "author_name": "",
        "author_email": "broken",
        "content": "ok",
    });
    let response = router
        .oneshot(request("POST", "/api/comments", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["errors"]["author_name"].is_string());
    assert!(json["errors"]["author_email"].is_string());
    assert!(json["errors"]["content"].is_null());
    assert!(store.all_comments().is_empty());
}

#[tokio::test]
async fn rapid_resubmission_is_throttled() {
    let (router, _store, post_id) = app(Duration::from_secs(30));

    let first = router
        .clone()
        .oneshot(request("POST", "/api/comments", Some(submission(post_id))))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .clone()
        .oneshot(request("POST", "/api/comments", Some(submission(post_id))))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(second).await;
    assert!(json["retry_after_secs"].as_u64().unwrap() >= 1);

    // A forwarded address identifies a different client context.
    let mut from_elsewhere = request("POST", "/api/comments", Some(submission(post_id)));
    from_elsewhere
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.4".parse().unwrap());
    let third = router.oneshot(from_elsewhere).await.unwrap();
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn the_thread_endpoint_nests_replies_and_never_exposes_emails() {
    let (router, store, post_id) = app(Duration::from_secs(30));
    store.add_comment(approved_comment(1, post_id, None, 0));
    store.add_comment(approved_comment(2, post_id, Some(1), 1));
    store.add_comment(approved_comment(3, post_id, Some(99), 2));

    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/posts/{post_id}/comments"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains("author_email"));
    assert!(!text.contains("@example.com"));

    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["replies"][0]["author_name"], "author-2");
    assert_eq!(json[1]["replies"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn the_count_endpoint_reports_approved_comments() {
    let (router, store, post_id) = app(Duration::from_secs(30));
    store.add_comment(approved_comment(1, post_id, None, 0));
    store.add_comment(approved_comment(2, post_id, Some(1), 1));

    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/posts/{post_id}/comments/count"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "count": 2 }));
}

#[tokio::test]
async fn submission_outcomes_show_up_in_the_metrics_exposition() {
    let (router, _store, post_id) = app(Duration::from_secs(30));

    router
        .clone()
        .oneshot(request("POST", "/api/comments", Some(submission(post_id))))
        .await
        .unwrap();

    let response = router
        .oneshot(request("GET", "/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("maqblog_comment_submissions"));
    assert!(text.contains("Accepted"));
}
