//! API error type: one enum for every failure mode, converted into an HTTP
//! response via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use echo_db::StoreError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate engagement, self-retweet, taken username, and the like.
    #[error("{0}")]
    Conflict(String),

    /// The requester is not the owner of the entity they tried to mutate.
    #[error("{0}")]
    PermissionDenied(String),

    /// Malformed input or a bad cross-entity reference.
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Anything unexpected; details go to the log, not the client.
    #[error("internal error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            StoreError::Conflict(msg) => Self::Conflict(msg.to_string()),
            StoreError::PermissionDenied(msg) => Self::PermissionDenied(msg.to_string()),
            StoreError::InvalidArgument(msg) => Self::InvalidArgument(msg.to_string()),
            other => {
                error!("store failure: {other}");
                Self::Internal
            }
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_their_status_class() {
        let cases = [
            (StoreError::NotFound("post"), StatusCode::NOT_FOUND),
            (
                StoreError::Conflict("you have already liked this post"),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::PermissionDenied("only the author can delete this post"),
                StatusCode::FORBIDDEN,
            ),
            (
                StoreError::InvalidArgument("parent comment must be on the same post"),
                StatusCode::BAD_REQUEST,
            ),
            (StoreError::LockPoisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (store_err, expected) in cases {
            assert_eq!(ApiError::from(store_err).status(), expected);
        }
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = ApiError::from(StoreError::NotFound("parent comment"));
        assert_eq!(err.to_string(), "parent comment not found");
    }
}
