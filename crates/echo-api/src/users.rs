use axum::{
    Json,
    extract::{Path, State},
};

use echo_db::models::{AuthorRow, UserRow};
use echo_types::api::{UserProfile, UserResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::time::parse_db_time;

pub(crate) fn author_response(author: AuthorRow) -> UserResponse {
    UserResponse {
        id: author.id,
        username: author.username,
        display_name: author.display_name,
        bio: author.bio,
        created_at: parse_db_time(&author.created_at),
    }
}

fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        bio: user.bio,
        created_at: parse_db_time(&user.created_at),
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .db
        .get_user_by_username(&username)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    let post_count = state.db.count_user_posts(user.id)?;

    Ok(Json(UserProfile {
        user: user_response(user),
        post_count,
    }))
}
