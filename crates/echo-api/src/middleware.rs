use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::auth::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

/// Optional viewer identity on read requests. Anonymous viewers read with
/// all engagement flags down.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|claims| claims.sub)
    }
}

/// Extract and validate the bearer JWT; mutating routes refuse anonymous
/// requests outright.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = bearer_claims(&req, &state.jwt_secret).ok_or(StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Reads the bearer token when one is present; anonymous requests proceed
/// with no viewer.
pub async fn viewer_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let viewer = Viewer(bearer_claims(&req, &state.jwt_secret));
    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn bearer_claims(req: &Request, secret: &str) -> Option<Claims> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
