use rusqlite::{OptionalExtension, params};

use crate::Database;
use crate::error::StoreError;
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        display_name: &str,
        bio: Option<&str>,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, display_name, bio)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![username, email, password_hash, display_name, bio],
            )
            .map_err(|e| StoreError::or_conflict(e, "username or email already registered"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, display_name, bio, created_at, updated_at
                 FROM users WHERE username = ?1",
            )?;
            Ok(stmt.query_row([username], user_from_row).optional()?)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, display_name, bio, created_at, updated_at
                 FROM users WHERE email = ?1",
            )?;
            Ok(stmt.query_row([email], user_from_row).optional()?)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, display_name, bio, created_at, updated_at
                 FROM users WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], user_from_row).optional()?)
        })
    }

    /// Removing a user takes their posts, likes, retweets, and comments
    /// with them through the schema cascades.
    pub fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound("user"));
            }
            Ok(())
        })
    }

    /// Original posts authored by the user; mirrored retweet-posts do not
    /// count toward a profile.
    pub fn count_user_posts(&self, user_id: i64) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE user_id = ?1 AND is_retweet = 0",
                [user_id],
                |row| row.get(0),
            )?)
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        display_name: row.get(4)?,
        bio: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
