//! Row types mapping directly to SQLite rows. Timestamps stay as the TEXT
//! the store assigned; the API layer converts them for the wire.

use rusqlite::Row;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Author identity joined eagerly onto posts, comments, and engagements.
pub struct AuthorRow {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: String,
}

pub struct PostRow {
    pub id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: i64,
    pub is_retweet: bool,
    pub original_post_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub author: AuthorRow,
}

pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub post_id: i64,
    pub parent_comment_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub author: AuthorRow,
}

/// One liker or retweeter of a post. `post_id` is the liked post for likes
/// and the original post for retweets.
pub struct EngagementRow {
    pub id: i64,
    pub post_id: i64,
    pub created_at: String,
    pub user: AuthorRow,
}

/// Per-post aggregates recomputed on every read, never denormalized onto
/// the post row.
#[derive(Debug, Default)]
pub struct PostEngagement {
    pub like_count: i64,
    pub retweet_count: i64,
    pub comment_count: i64,
    pub liked_by_viewer: bool,
    pub retweeted_by_viewer: bool,
}

pub(crate) fn author_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<AuthorRow> {
    Ok(AuthorRow {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        display_name: row.get(offset + 2)?,
        bio: row.get(offset + 3)?,
        created_at: row.get(offset + 4)?,
    })
}

pub(crate) fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        content: row.get(1)?,
        image_url: row.get(2)?,
        user_id: row.get(3)?,
        is_retweet: row.get(4)?,
        original_post_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        author: author_from_row(row, 8)?,
    })
}

pub(crate) fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        content: row.get(1)?,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        parent_comment_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        author: author_from_row(row, 7)?,
    })
}
