use axum::{
    Json, Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::{require_auth, viewer_identity};
use crate::{comments, engagements, posts, users};

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/posts/{post_id}/likes", get(engagements::get_likers))
        .route("/posts/{post_id}/retweets", get(engagements::get_retweeters))
        .route("/comments/post/{post_id}", get(comments::get_post_comments))
        .route("/comments/{comment_id}", get(comments::get_comment))
        .route("/comments/{comment_id}/replies", get(comments::get_replies))
        .route("/users/{username}", get(users::get_profile));

    // Reads that report per-viewer engagement flags; anonymous is fine.
    let viewer_reads = Router::new()
        .route("/posts", get(posts::get_feed))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/posts/user/{username}", get(posts::get_user_posts))
        .layer(middleware::from_fn_with_state(state.clone(), viewer_identity));

    let protected = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{post_id}", delete(posts::delete_post))
        .route(
            "/posts/{post_id}/like",
            post(engagements::like_post).delete(engagements::unlike_post),
        )
        .route(
            "/posts/{post_id}/retweet",
            post(engagements::retweet_post).delete(engagements::unretweet_post),
        )
        .route("/comments", post(comments::create_comment))
        .route(
            "/comments/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(viewer_reads)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "app": "echo",
    }))
}
