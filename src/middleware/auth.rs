use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;
use crate::models::Role;
use crate::services::{AccessTokenClaims, TokenError};
use crate::utils::cookies::ACCESS_COOKIE;
use crate::AppState;

/// Require a valid access token cookie. Signature and expiry only; access
/// tokens are not individually revocable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("missing access token")))?;

    let claims = state.jwt.validate_access_token(&token).map_err(|e| {
        match e {
            TokenError::Expired => tracing::debug!("access token expired"),
            TokenError::Invalid(ref err) => tracing::debug!(error = %err, "access token invalid"),
        }
        AppError::Unauthorized(anyhow::anyhow!("invalid or expired access token"))
    })?;

    // Store claims in request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Restrict a route group to administrators. Runs after `auth_middleware`;
/// the role comes from the validated claims, with no database read.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<AccessTokenClaims>()
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("auth claims missing from request extensions"))
        })?;

    let role: Role = claims
        .role
        .parse()
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("unknown role")))?;

    if !role.authorized(&[Role::Admin]) {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "insufficient role"
        )));
    }

    Ok(next.run(req).await)
}

/// Extractor to easily get claims in handlers
pub struct AuthUser(pub AccessTokenClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<AccessTokenClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("auth claims missing from request extensions"))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
