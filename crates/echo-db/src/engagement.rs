use rusqlite::{Connection, OptionalExtension, params};

use crate::Database;
use crate::error::StoreError;
use crate::models::{self, EngagementRow};
use crate::posts::ensure_post_exists;

impl Database {
    /// At most one like per (user, post). The pre-check gives the friendly
    /// Conflict; the unique constraint settles the race at insert.
    pub fn like_post(&self, user_id: i64, post_id: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            ensure_post_exists(tx, post_id)?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM likes WHERE user_id = ?1 AND post_id = ?2",
                    params![user_id, post_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::Conflict("you have already liked this post"));
            }

            tx.execute(
                "INSERT INTO likes (user_id, post_id) VALUES (?1, ?2)",
                params![user_id, post_id],
            )
            .map_err(|e| StoreError::or_conflict(e, "you have already liked this post"))?;
            Ok(())
        })
    }

    pub fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let deleted = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
                params![user_id, post_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound("like"));
            }
            Ok(())
        })
    }

    /// Inserts the retweet join row and the mirrored timeline post in one
    /// transaction; neither write survives without the other. Returns the
    /// mirrored post id.
    pub fn retweet_post(&self, user_id: i64, post_id: i64) -> Result<i64, StoreError> {
        self.with_tx(|tx| {
            let (owner, content): (i64, String) = tx
                .query_row(
                    "SELECT user_id, content FROM posts WHERE id = ?1",
                    [post_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(StoreError::NotFound("post"))?;

            if owner == user_id {
                return Err(StoreError::Conflict("you cannot retweet your own post"));
            }

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM retweets WHERE user_id = ?1 AND original_post_id = ?2",
                    params![user_id, post_id],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::Conflict("you have already retweeted this post"));
            }

            tx.execute(
                "INSERT INTO retweets (user_id, original_post_id) VALUES (?1, ?2)",
                params![user_id, post_id],
            )
            .map_err(|e| StoreError::or_conflict(e, "you have already retweeted this post"))?;

            // Content is copied at the moment of retweeting, not live-linked.
            tx.execute(
                "INSERT INTO posts (content, user_id, is_retweet, original_post_id)
                 VALUES (?1, ?2, 1, ?3)",
                params![content, user_id, post_id],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Deletes the retweet row; removal of the mirrored post is best-effort
    /// (it may have been deleted on its own).
    pub fn unretweet_post(&self, user_id: i64, post_id: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let deleted = tx.execute(
                "DELETE FROM retweets WHERE user_id = ?1 AND original_post_id = ?2",
                params![user_id, post_id],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound("retweet"));
            }

            tx.execute(
                "DELETE FROM posts
                 WHERE user_id = ?1 AND original_post_id = ?2 AND is_retweet = 1",
                params![user_id, post_id],
            )?;
            Ok(())
        })
    }

    pub fn list_likers(&self, post_id: i64) -> Result<Vec<EngagementRow>, StoreError> {
        self.with_conn(|conn| {
            ensure_post_exists(conn, post_id)?;
            query_engagements(
                conn,
                "SELECT l.id, l.post_id, l.created_at,
                        u.id, u.username, u.display_name, u.bio, u.created_at
                 FROM likes l JOIN users u ON l.user_id = u.id
                 WHERE l.post_id = ?1
                 ORDER BY l.created_at DESC, l.id DESC",
                post_id,
            )
        })
    }

    pub fn list_retweeters(&self, post_id: i64) -> Result<Vec<EngagementRow>, StoreError> {
        self.with_conn(|conn| {
            ensure_post_exists(conn, post_id)?;
            query_engagements(
                conn,
                "SELECT r.id, r.original_post_id, r.created_at,
                        u.id, u.username, u.display_name, u.bio, u.created_at
                 FROM retweets r JOIN users u ON r.user_id = u.id
                 WHERE r.original_post_id = ?1
                 ORDER BY r.created_at DESC, r.id DESC",
                post_id,
            )
        })
    }
}

fn query_engagements(
    conn: &Connection,
    sql: &str,
    post_id: i64,
) -> Result<Vec<EngagementRow>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([post_id], |row| {
            Ok(EngagementRow {
                id: row.get(0)?,
                post_id: row.get(1)?,
                created_at: row.get(2)?,
                user: models::author_from_row(row, 3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
