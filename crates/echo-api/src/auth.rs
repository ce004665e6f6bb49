use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::error;

use echo_db::Database;
use echo_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::pagination::PageLimits;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub pages: PageLimits,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 50 {
        return Err(ApiError::InvalidArgument(
            "username must be 3-50 characters".into(),
        ));
    }
    if !req.email.contains('@') {
        return Err(ApiError::InvalidArgument("invalid email address".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::InvalidArgument(
            "password must be at least 8 characters".into(),
        ));
    }
    let display_len = req.display_name.chars().count();
    if display_len == 0 || display_len > 100 {
        return Err(ApiError::InvalidArgument(
            "display name must be 1-100 characters".into(),
        ));
    }
    if req.bio.as_ref().is_some_and(|b| b.chars().count() > 500) {
        return Err(ApiError::InvalidArgument(
            "bio must be at most 500 characters".into(),
        ));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("username is already taken".into()));
    }
    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("email is already registered".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("password hashing failed: {e}");
            ApiError::Internal
        })?
        .to_string();

    let user_id = state.db.create_user(
        &req.username,
        &req.email,
        &password_hash,
        &req.display_name,
        req.bio.as_deref(),
    )?;

    let token = issue_token(&state.jwt_secret, user_id, &req.username).map_err(|e| {
        error!("token issuance failed: {e}");
        ApiError::Internal
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
        error!("stored password hash is unreadable: {e}");
        ApiError::Internal
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("invalid email or password".into()))?;

    let token = issue_token(&state.jwt_secret, user.id, &user.username).map_err(|e| {
        error!("token issuance failed: {e}");
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

pub(crate) fn issue_token(
    secret: &str,
    user_id: i64,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
