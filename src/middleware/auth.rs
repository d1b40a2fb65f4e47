use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

use crate::app::AppState;
use crate::error::ApiError;
use crate::policy::{Identity, Requester};

/// Authorization schemes accepted for bearer tokens
const SCHEMES: &[&str] = &["Bearer", "Token"];

/// Resolves the bearer token (if any) to a `Requester` and stores it in the
/// request extensions. Requests without credentials continue as anonymous;
/// requests with bad credentials stop here with 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let requester = match extract_bearer_token(request.headers()).map_err(ApiError::unauthorized)? {
        Some(token) => Requester::Authenticated(resolve_identity(&state, &token).await?),
        None => Requester::Anonymous,
    };

    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

/// Extract the token from the Authorization header.
///
/// Ok(None) when there is no header or it uses a scheme we do not handle.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid token header. Token string should not contain invalid characters.".to_string())?;

    let mut parts = auth_str.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (None, _) => Err("Invalid token header. No credentials provided.".to_string()),
        (Some(_), Some(_)) => Err("Invalid token header. Token string should not contain spaces.".to_string()),
        (Some(token), None) => Ok(Some(token.to_string())),
    }
}

/// Validate the token and re-load the identity it names
async fn resolve_identity(state: &AppState, token: &str) -> Result<Identity, ApiError> {
    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid token.")
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::unauthorized("Invalid token."))?;

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid token."))?;

    if !user.is_active {
        tracing::warn!("Token presented for inactive user {}", user.id);
        return Err(ApiError::unauthorized("User inactive or deleted."));
    }

    let profile = state.store.find_profile_by_user(user.id).await?;

    tracing::debug!("Authenticated user {} ({})", user.id, user.email);
    Ok(Identity {
        user_id: user.id,
        email: user.email,
        profile_id: profile.map(|p| p.id),
        is_staff: user.is_staff,
    })
}

/// Handlers take `Requester` directly; routes outside the authentication
/// layer see an anonymous caller.
#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Requester>().cloned().unwrap_or_default())
    }
}
