use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use echo_types::api::{LikeResponse, MessageResponse, RetweetResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Claims;
use crate::time::parse_db_time;
use crate::users::author_response;

pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.like_post(claims.sub, post_id)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "post liked".into(),
            detail: Some(format!("post {post_id} has been liked")),
        }),
    ))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.unlike_post(claims.sub, post_id)?;
    Ok(Json(MessageResponse {
        message: "post unliked".into(),
        detail: Some(format!("like removed from post {post_id}")),
    }))
}

pub async fn retweet_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.retweet_post(claims.sub, post_id)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "post retweeted".into(),
            detail: Some(format!("post {post_id} has been retweeted")),
        }),
    ))
}

pub async fn unretweet_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.unretweet_post(claims.sub, post_id)?;
    Ok(Json(MessageResponse {
        message: "retweet removed".into(),
        detail: Some(format!("retweet of post {post_id} has been removed")),
    }))
}

pub async fn get_likers(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<LikeResponse>>, ApiError> {
    let rows = state.db.list_likers(post_id)?;
    let likes = rows
        .into_iter()
        .map(|row| LikeResponse {
            id: row.id,
            post_id: row.post_id,
            created_at: parse_db_time(&row.created_at),
            user: author_response(row.user),
        })
        .collect();
    Ok(Json(likes))
}

pub async fn get_retweeters(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<RetweetResponse>>, ApiError> {
    let rows = state.db.list_retweeters(post_id)?;
    let retweets = rows
        .into_iter()
        .map(|row| RetweetResponse {
            id: row.id,
            original_post_id: row.post_id,
            created_at: parse_db_time(&row.created_at),
            user: author_response(row.user),
        })
        .collect();
    Ok(Json(retweets))
}
