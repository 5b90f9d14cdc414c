//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tally_core::auth::{AuthError, Identity};
use tally_shared::types::UserId;
use tally_shared::{Claims, JwtError};

use crate::{AppState, ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// Valid claims are stored in the request extensions for [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => {
            ApiError::unauthorized("token_expired", "Token has expired").into_response()
        }
        Err(_) => {
            ApiError::unauthorized("invalid_token", "Invalid or malformed token").into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let owner = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the owner identity from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the username the token was issued to.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl Identity for AuthUser {
    fn current_owner(&self) -> Result<UserId, AuthError> {
        Ok(self.user_id())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("unauthorized", "Authentication required"))
    }
}
