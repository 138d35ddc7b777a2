//! Bearer-token authentication for protected routes.
//!
//! The middleware verifies the access token and attaches a [`CurrentUser`]
//! extension; handlers enforce role requirements on top of that. A missing
//! or bad token is 401, an insufficient role is 403.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::policy::{self, Role};
use crate::services::{Claims, TokenKind};

/// Identity established by the access token, not re-read per request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i32,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let claims = state
        .shared
        .sessions
        .verify(&token, TokenKind::Access)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// Role gate used inside handlers, after the middleware has authenticated.
pub fn require(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    if policy::allows(user.role, allowed) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}
