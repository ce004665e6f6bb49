use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::error::StoreError;
use crate::models::{self, PostEngagement, PostRow};

const POST_SELECT: &str = "SELECT p.id, p.content, p.image_url, p.user_id, p.is_retweet, \
     p.original_post_id, p.created_at, p.updated_at, \
     u.id, u.username, u.display_name, u.bio, u.created_at \
     FROM posts p JOIN users u ON p.user_id = u.id";

impl Database {
    pub fn create_post(
        &self,
        user_id: i64,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<PostRow, StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO posts (content, image_url, user_id, is_retweet)
                 VALUES (?1, ?2, ?3, 0)",
                params![content, image_url, user_id],
            )?;
            let id = tx.last_insert_rowid();
            query_post(tx, id)?.ok_or(StoreError::NotFound("post"))
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>, StoreError> {
        self.with_conn(|conn| query_post(conn, id))
    }

    pub fn delete_post(&self, id: i64, requester: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let owner: i64 = tx
                .query_row("SELECT user_id FROM posts WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(StoreError::NotFound("post"))?;
            if owner != requester {
                return Err(StoreError::PermissionDenied(
                    "only the author can delete this post",
                ));
            }
            // Likes, retweets, comments, and mirrored retweet-posts all go
            // with the row via the schema cascades.
            tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Primary feed: original posts only, newest first. The total is
    /// computed under the same filter for page arithmetic.
    pub fn feed_page(&self, limit: u32, offset: u32) -> Result<(Vec<PostRow>, i64), StoreError> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE is_retweet = 0",
                [],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "{POST_SELECT} WHERE p.is_retweet = 0
                 ORDER BY p.created_at DESC, p.id DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map(params![limit, offset], models::post_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    pub fn user_posts_page(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<PostRow>, i64), StoreError> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE user_id = ?1 AND is_retweet = 0",
                [user_id],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "{POST_SELECT} WHERE p.user_id = ?1 AND p.is_retweet = 0
                 ORDER BY p.created_at DESC, p.id DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(params![user_id, limit, offset], models::post_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    /// Aggregates for one post: counts plus the viewer's own engagement
    /// flags. Recomputed on every read so the numbers can never go stale.
    pub fn post_engagement(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<PostEngagement, StoreError> {
        self.with_conn(|conn| {
            let like_count = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            let retweet_count = conn.query_row(
                "SELECT COUNT(*) FROM retweets WHERE original_post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            let comment_count = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;

            let (liked_by_viewer, retweeted_by_viewer) = match viewer {
                Some(viewer_id) => (
                    engaged(
                        conn,
                        "SELECT 1 FROM likes WHERE user_id = ?1 AND post_id = ?2",
                        viewer_id,
                        post_id,
                    )?,
                    engaged(
                        conn,
                        "SELECT 1 FROM retweets WHERE user_id = ?1 AND original_post_id = ?2",
                        viewer_id,
                        post_id,
                    )?,
                ),
                None => (false, false),
            };

            Ok(PostEngagement {
                like_count,
                retweet_count,
                comment_count,
                liked_by_viewer,
                retweeted_by_viewer,
            })
        })
    }
}

pub(crate) fn ensure_post_exists(conn: &Connection, post_id: i64) -> Result<(), StoreError> {
    conn.query_row("SELECT 1 FROM posts WHERE id = ?1", [post_id], |_| Ok(()))
        .optional()?
        .ok_or(StoreError::NotFound("post"))
}

fn engaged(conn: &Connection, sql: &str, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(sql, params![user_id, post_id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>, StoreError> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.id = ?1"))?;
    Ok(stmt.query_row([id], models::post_from_row).optional()?)
}
