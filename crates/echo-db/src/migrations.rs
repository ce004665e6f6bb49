use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            display_name    TEXT NOT NULL,
            bio             TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id                  INTEGER PRIMARY KEY,
            content             TEXT NOT NULL,
            image_url           TEXT,
            user_id             INTEGER NOT NULL
                                REFERENCES users(id) ON DELETE CASCADE,
            is_retweet          INTEGER NOT NULL DEFAULT 0,
            -- Mirrored retweet-posts reference the post they mirror and go
            -- down with it.
            original_post_id    INTEGER
                                REFERENCES posts(id) ON DELETE CASCADE,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_user
            ON posts(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_created
            ON posts(created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_original
            ON posts(original_post_id);

        CREATE TABLE IF NOT EXISTS likes (
            id          INTEGER PRIMARY KEY,
            user_id     INTEGER NOT NULL
                        REFERENCES users(id) ON DELETE CASCADE,
            post_id     INTEGER NOT NULL
                        REFERENCES posts(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, post_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_post
            ON likes(post_id);

        CREATE TABLE IF NOT EXISTS retweets (
            id                  INTEGER PRIMARY KEY,
            user_id             INTEGER NOT NULL
                                REFERENCES users(id) ON DELETE CASCADE,
            original_post_id    INTEGER NOT NULL
                                REFERENCES posts(id) ON DELETE CASCADE,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, original_post_id)
        );

        CREATE INDEX IF NOT EXISTS idx_retweets_post
            ON retweets(original_post_id);

        CREATE TABLE IF NOT EXISTS comments (
            id                  INTEGER PRIMARY KEY,
            content             TEXT NOT NULL,
            user_id             INTEGER NOT NULL
                                REFERENCES users(id) ON DELETE CASCADE,
            post_id             INTEGER NOT NULL
                                REFERENCES posts(id) ON DELETE CASCADE,
            -- Replies cascade with their parent, transitively.
            parent_comment_id   INTEGER
                                REFERENCES comments(id) ON DELETE CASCADE,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_comments_parent
            ON comments(parent_comment_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
