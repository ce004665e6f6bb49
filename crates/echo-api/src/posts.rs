use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use echo_db::{Database, StoreError, models::PostRow};
use echo_types::api::{CreatePostRequest, Paginated, PostDetail, PostResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::{Claims, Viewer};
use crate::pagination::{PageQuery, paginate};
use crate::time::parse_db_time;
use crate::users::author_response;

/// Attach the read-time aggregates to a post row: counts plus the viewer's
/// own like/retweet flags.
pub(crate) fn build_post_response(
    db: &Database,
    row: PostRow,
    viewer: Option<i64>,
) -> Result<PostResponse, StoreError> {
    let engagement = db.post_engagement(row.id, viewer)?;
    Ok(PostResponse {
        id: row.id,
        content: row.content,
        image_url: row.image_url,
        created_at: parse_db_time(&row.created_at),
        is_retweet: row.is_retweet,
        author: author_response(row.author),
        like_count: engagement.like_count,
        retweet_count: engagement.retweet_count,
        comment_count: engagement.comment_count,
        is_liked_by_viewer: engagement.liked_by_viewer,
        is_retweeted_by_viewer: engagement.retweeted_by_viewer,
    })
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let length = req.content.chars().count();
    if length == 0 || length > 280 {
        return Err(ApiError::InvalidArgument(
            "post content must be 1-280 characters".into(),
        ));
    }
    if req.image_url.as_ref().is_some_and(|url| url.len() > 500) {
        return Err(ApiError::InvalidArgument(
            "image url must be at most 500 characters".into(),
        ));
    }

    let row = state
        .db
        .create_post(claims.sub, &req.content, req.image_url.as_deref())?;
    let response = build_post_response(&state.db, row, Some(claims.sub))?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Json<Paginated<PostResponse>>, ApiError> {
    let page = query.clamp(&state.pages);
    let viewer_id = viewer.id();

    let db = state.clone();
    let (items, total) = spawn_page(move || {
        let (rows, total) = db.db.feed_page(page.size, page.offset())?;
        enrich_rows(&db.db, rows, viewer_id).map(|items| (items, total))
    })
    .await?;

    Ok(Json(paginate(items, total, page)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Json<PostDetail>, ApiError> {
    let row = state
        .db
        .get_post(post_id)?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    let viewer_id = viewer.id();

    // A retweet resolves the post it mirrors, enriched for the same viewer.
    let original_post = match (row.is_retweet, row.original_post_id) {
        (true, Some(original_id)) => state
            .db
            .get_post(original_id)?
            .map(|original| build_post_response(&state.db, original, viewer_id))
            .transpose()?,
        _ => None,
    };

    let updated_at = parse_db_time(&row.updated_at);
    let post = build_post_response(&state.db, row, viewer_id)?;

    Ok(Json(PostDetail {
        post,
        original_post,
        updated_at,
    }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_post(post_id, claims.sub)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Json<Paginated<PostResponse>>, ApiError> {
    let user = state
        .db
        .get_user_by_username(&username)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    let page = query.clamp(&state.pages);
    let viewer_id = viewer.id();

    let db = state.clone();
    let (items, total) = spawn_page(move || {
        let (rows, total) = db.db.user_posts_page(user.id, page.size, page.offset())?;
        enrich_rows(&db.db, rows, viewer_id).map(|items| (items, total))
    })
    .await?;

    Ok(Json(paginate(items, total, page)))
}

fn enrich_rows(
    db: &Database,
    rows: Vec<PostRow>,
    viewer: Option<i64>,
) -> Result<Vec<PostResponse>, StoreError> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(build_post_response(db, row, viewer)?);
    }
    Ok(items)
}

/// Run a blocking page read off the async runtime.
pub(crate) async fn spawn_page<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {e}");
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
