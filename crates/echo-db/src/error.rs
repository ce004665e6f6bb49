//! Error taxonomy for the store layer.
//!
//! Every engine operation returns [`StoreError`]; the API layer maps the
//! variants onto HTTP status classes.

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness or business-rule violation (duplicate engagement,
    /// self-retweet, taken username).
    #[error("{0}")]
    Conflict(&'static str),

    /// An ownership check failed on update or delete.
    #[error("{0}")]
    PermissionDenied(&'static str),

    /// A malformed cross-entity reference.
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// An unclassified SQLite failure; aborts the owning transaction.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking holder.
    #[error("connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Remap a unique-constraint violation to `Conflict(conflict)`. This is
    /// the backstop for the check-then-insert race on engagement rows: two
    /// near-simultaneous identical inserts must resolve to success plus
    /// Conflict, never an internal error.
    pub(crate) fn or_conflict(err: rusqlite::Error, conflict: &'static str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(conflict)
            }
            other => Self::Sqlite(other),
        }
    }
}
