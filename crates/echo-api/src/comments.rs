use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use echo_db::{Database, StoreError, models::CommentRow};
use echo_types::api::{
    CommentResponse, CommentWithReplies, CreateCommentRequest, MessageResponse, Paginated,
    UpdateCommentRequest,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Claims;
use crate::pagination::{PageQuery, paginate};
use crate::posts::spawn_page;
use crate::time::parse_db_time;
use crate::users::author_response;

fn build_comment_response(db: &Database, row: CommentRow) -> Result<CommentResponse, StoreError> {
    let reply_count = db.reply_count(row.id)?;
    Ok(CommentResponse {
        id: row.id,
        content: row.content,
        post_id: row.post_id,
        parent_comment_id: row.parent_comment_id,
        created_at: parse_db_time(&row.created_at),
        updated_at: parse_db_time(&row.updated_at),
        author: author_response(row.author),
        reply_count,
    })
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    let length = content.chars().count();
    if length == 0 || length > 500 {
        return Err(ApiError::InvalidArgument(
            "comment content must be 1-500 characters".into(),
        ));
    }
    Ok(())
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_content(&req.content)?;
    if req.post_id <= 0 || req.parent_comment_id.is_some_and(|id| id <= 0) {
        return Err(ApiError::InvalidArgument("ids must be positive".into()));
    }

    let row = state.db.create_comment(
        claims.sub,
        req.post_id,
        req.parent_comment_id,
        &req.content,
    )?;
    let response = build_comment_response(&state.db, row)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The comment plus its direct replies, one level deep. Deeper levels go
/// through the replies listing.
pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentWithReplies>, ApiError> {
    let row = state
        .db
        .get_comment(comment_id)?
        .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;

    let mut replies = Vec::new();
    for reply in state.db.direct_replies(comment_id)? {
        replies.push(build_comment_response(&state.db, reply)?);
    }
    let comment = build_comment_response(&state.db, row)?;

    Ok(Json(CommentWithReplies { comment, replies }))
}

pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<CommentResponse>>, ApiError> {
    let page = query.clamp(&state.pages);

    let db = state.clone();
    let (items, total) = spawn_page(move || {
        let (rows, total) = db.db.top_level_comments_page(post_id, page.size, page.offset())?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(build_comment_response(&db.db, row)?);
        }
        Ok((items, total))
    })
    .await?;

    Ok(Json(paginate(items, total, page)))
}

pub async fn get_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<CommentResponse>>, ApiError> {
    let page = query.clamp(&state.pages);

    let db = state.clone();
    let (items, total) = spawn_page(move || {
        let (rows, total) = db.db.replies_page(comment_id, page.size, page.offset())?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(build_comment_response(&db.db, row)?);
        }
        Ok((items, total))
    })
    .await?;

    Ok(Json(paginate(items, total, page)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    validate_content(&req.content)?;
    let row = state.db.update_comment(comment_id, claims.sub, &req.content)?;
    Ok(Json(build_comment_response(&state.db, row)?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.delete_comment(comment_id, claims.sub)?;
    Ok(Json(MessageResponse {
        message: "comment deleted".into(),
        detail: Some(format!(
            "comment {comment_id} and all its replies have been deleted"
        )),
    }))
}
