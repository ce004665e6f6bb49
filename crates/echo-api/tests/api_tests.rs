//! Integration tests for the HTTP API.
//!
//! Tests drive the real `Router` via `tower::ServiceExt` without starting
//! a TCP server, against a fresh in-memory store per test.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use echo_api::auth::{AppState, AppStateInner};
use echo_api::pagination::PageLimits;
use echo_api::router::build_router;
use echo_db::Database;

fn test_app() -> Router {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        pages: PageLimits::default(),
    });
    build_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "username": name,
            "email": format!("{name}@example.com"),
            "password": "correct horse battery",
            "display_name": name,
            "bio": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn create_post(app: &Router, token: &str, content: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/posts",
        Some(token),
        Some(json!({ "content": content, "image_url": null })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_then_login() {
    let app = test_app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "correct horse battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["token"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_requests_cannot_mutate() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/posts",
        None,
        Some(json!({ "content": "hi", "image_url": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn feed_serves_enriched_posts_to_anonymous_viewers() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    create_post(&app, &alice, "hello world").await;

    let (status, body) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let item = &body["items"][0];
    assert_eq!(item["content"], "hello world");
    assert_eq!(item["author"]["username"], "alice");
    assert_eq!(item["like_count"], 0);
    assert_eq!(item["is_liked_by_viewer"], false);
}

#[tokio::test]
async fn like_flow_reports_per_viewer_flags() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "hello").await;

    let (status, _) = send(&app, "POST", &format!("/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CREATED);

    // Liking twice is a conflict, surfaced as a bad request.
    let (status, _) = send(&app, "POST", &format!("/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, as_bob) = send(&app, "GET", &format!("/posts/{post_id}"), Some(&bob), None).await;
    assert_eq!(as_bob["like_count"], 1);
    assert_eq!(as_bob["is_liked_by_viewer"], true);

    let (_, as_alice) = send(&app, "GET", &format!("/posts/{post_id}"), Some(&alice), None).await;
    assert_eq!(as_alice["like_count"], 1);
    assert_eq!(as_alice["is_liked_by_viewer"], false);

    let (_, likers) = send(&app, "GET", &format!("/posts/{post_id}/likes"), None, None).await;
    assert_eq!(likers.as_array().unwrap().len(), 1);
    assert_eq!(likers[0]["user"]["username"], "bob");

    let (status, _) =
        send(&app, "DELETE", &format!("/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        send(&app, "DELETE", &format!("/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn retweet_mirrors_a_post_but_stays_out_of_the_feed() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "worth sharing").await;

    // Retweeting your own post is rejected.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/posts/{post_id}/retweet"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/posts/{post_id}/retweet"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The feed still holds only the original.
    let (_, feed) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["items"][0]["id"], post_id);
    assert_eq!(feed["items"][0]["retweet_count"], 1);

    // The mirrored post took the next rowid; fetching it resolves the
    // original as a nested, enriched view.
    let mirror_id = post_id + 1;
    let (status, mirror) = send(&app, "GET", &format!("/posts/{mirror_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mirror["is_retweet"], true);
    assert_eq!(mirror["content"], "worth sharing");
    assert_eq!(mirror["original_post"]["id"], post_id);
    assert_eq!(mirror["original_post"]["retweet_count"], 1);
    assert_eq!(mirror["original_post"]["is_retweeted_by_viewer"], true);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/posts/{post_id}/retweet"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/posts/{mirror_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_thread_flow() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "discuss").await;
    let other_post = create_post(&app, &alice, "unrelated").await;

    let (status, root) = send(
        &app,
        "POST",
        "/comments",
        Some(&bob),
        Some(json!({ "content": "first!", "post_id": post_id, "parent_comment_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let root_id = root["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/comments",
        Some(&alice),
        Some(json!({ "content": "welcome", "post_id": post_id, "parent_comment_id": root_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A reply naming a parent from another post is rejected outright.
    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&alice),
        Some(json!({ "content": "crossed", "post_id": other_post, "parent_comment_id": root_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "parent comment must be on the same post");

    let (_, with_replies) = send(&app, "GET", &format!("/comments/{root_id}"), None, None).await;
    assert_eq!(with_replies["reply_count"], 1);
    assert_eq!(with_replies["replies"].as_array().unwrap().len(), 1);
    assert_eq!(with_replies["replies"][0]["content"], "welcome");

    // Top-level listing holds only the root.
    let (_, top) = send(&app, "GET", &format!("/comments/post/{post_id}"), None, None).await;
    assert_eq!(top["total"], 1);

    // Ownership: only the author may edit or delete.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/comments/{root_id}"),
        Some(&alice),
        Some(json!({ "content": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &format!("/comments/{root_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/comments/{root_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_pagination_envelope() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    for i in 0..5 {
        create_post(&app, &alice, &format!("post {i}")).await;
    }

    let (status, body) = send(&app, "GET", "/posts?page=2&page_size=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_entities_return_not_found() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/posts/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/users/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/comments/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_profile_counts_original_posts() {
    let app = test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let post_id = create_post(&app, &alice, "hello").await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/posts/{post_id}/retweet"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, profile) = send(&app, "GET", "/users/bob", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "bob");
    // Mirrored retweet-posts do not count toward a profile.
    assert_eq!(profile["post_count"], 0);

    let (_, posts) = send(&app, "GET", "/posts/user/bob", None, None).await;
    assert_eq!(posts["total"], 0);
}
