use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::error::StoreError;
use crate::models::{self, CommentRow};
use crate::posts::ensure_post_exists;

const COMMENT_SELECT: &str = "SELECT c.id, c.content, c.user_id, c.post_id, \
     c.parent_comment_id, c.created_at, c.updated_at, \
     u.id, u.username, u.display_name, u.bio, u.created_at \
     FROM comments c JOIN users u ON c.user_id = u.id";

impl Database {
    /// A reply must name a parent on the same post; cross-post parents are
    /// rejected before anything is written.
    pub fn create_comment(
        &self,
        user_id: i64,
        post_id: i64,
        parent_comment_id: Option<i64>,
        content: &str,
    ) -> Result<CommentRow, StoreError> {
        self.with_tx(|tx| {
            ensure_post_exists(tx, post_id)?;

            if let Some(parent_id) = parent_comment_id {
                let parent_post: i64 = tx
                    .query_row(
                        "SELECT post_id FROM comments WHERE id = ?1",
                        [parent_id],
                        |row| row.get(0),
                    )
                    .optional()?
                    .ok_or(StoreError::NotFound("parent comment"))?;
                if parent_post != post_id {
                    return Err(StoreError::InvalidArgument(
                        "parent comment must be on the same post",
                    ));
                }
            }

            tx.execute(
                "INSERT INTO comments (content, user_id, post_id, parent_comment_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![content, user_id, post_id, parent_comment_id],
            )?;
            let id = tx.last_insert_rowid();
            query_comment(tx, id)?.ok_or(StoreError::NotFound("comment"))
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>, StoreError> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    pub fn update_comment(
        &self,
        id: i64,
        requester: i64,
        content: &str,
    ) -> Result<CommentRow, StoreError> {
        self.with_tx(|tx| {
            check_owner(tx, id, requester, "only the author can update this comment")?;
            tx.execute(
                "UPDATE comments SET content = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![content, id],
            )?;
            query_comment(tx, id)?.ok_or(StoreError::NotFound("comment"))
        })
    }

    pub fn delete_comment(&self, id: i64, requester: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            check_owner(tx, id, requester, "only the author can delete this comment")?;
            // The whole reply subtree cascades with the row.
            tx.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn top_level_comments_page(
        &self,
        post_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<CommentRow>, i64), StoreError> {
        self.with_conn(|conn| {
            ensure_post_exists(conn, post_id)?;
            let total = conn.query_row(
                "SELECT COUNT(*) FROM comments
                 WHERE post_id = ?1 AND parent_comment_id IS NULL",
                [post_id],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.post_id = ?1 AND c.parent_comment_id IS NULL
                 ORDER BY c.created_at DESC, c.id DESC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(params![post_id, limit, offset], models::comment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    /// Replies read oldest-first, the natural order for a thread.
    pub fn replies_page(
        &self,
        parent_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<CommentRow>, i64), StoreError> {
        self.with_conn(|conn| {
            ensure_comment_exists(conn, parent_id)?;
            let total = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE parent_comment_id = ?1",
                [parent_id],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.parent_comment_id = ?1
                 ORDER BY c.created_at ASC, c.id ASC LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt
                .query_map(params![parent_id, limit, offset], models::comment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, total))
        })
    }

    /// Direct children only, one level deep. Deeper levels are fetched per
    /// level through [`Database::replies_page`].
    pub fn direct_replies(&self, parent_id: i64) -> Result<Vec<CommentRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.parent_comment_id = ?1
                 ORDER BY c.created_at ASC, c.id ASC"
            ))?;
            let rows = stmt
                .query_map([parent_id], models::comment_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn reply_count(&self, comment_id: i64) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE parent_comment_id = ?1",
                [comment_id],
                |row| row.get(0),
            )?)
        })
    }
}

fn check_owner(
    conn: &Connection,
    id: i64,
    requester: i64,
    denied: &'static str,
) -> Result<(), StoreError> {
    let owner: i64 = conn
        .query_row("SELECT user_id FROM comments WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?
        .ok_or(StoreError::NotFound("comment"))?;
    if owner != requester {
        return Err(StoreError::PermissionDenied(denied));
    }
    Ok(())
}

fn ensure_comment_exists(conn: &Connection, id: i64) -> Result<(), StoreError> {
    conn.query_row("SELECT 1 FROM comments WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .ok_or(StoreError::NotFound("comment"))
}

fn query_comment(conn: &Connection, id: i64) -> Result<Option<CommentRow>, StoreError> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))?;
    Ok(stmt.query_row([id], models::comment_from_row).optional()?)
}
