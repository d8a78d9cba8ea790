use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dtos::auth::LoginRequest,
    error::AppError,
    middleware::AuthUser,
    models::SanitizedUser,
    utils::cookies::{self, CONTROL_COOKIE, REFRESH_COOKIE},
    utils::ValidatedJson,
    AppState,
};

/// Login with username (or email) and password. On success the session
/// triple travels back as cookies and the body carries the profile.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SanitizedUser>), AppError> {
    let (tokens, profile) = state.sessions.login(req).await?;
    let jar = cookies::with_session(jar, &tokens, &state.config.jwt);
    Ok((jar, Json(profile)))
}

/// Exchange the refresh cookie for a fresh session triple. No body; the
/// cookies are the whole response.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    let refresh_cookie = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let control_cookie = jar.get(CONTROL_COOKIE).map(|c| c.value().to_string());

    let tokens = state.sessions.refresh(refresh_cookie, control_cookie).await?;

    let jar = cookies::with_session(jar, &tokens, &state.config.jwt);
    Ok((jar, StatusCode::OK))
}

/// Cheap session probe for collaborators; the auth middleware has already
/// validated the access cookie by the time this runs.
pub async fn validate(_user: AuthUser) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// End the session. Always succeeds and always clears the cookies, whatever
/// state the presented refresh token is in.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let refresh_cookie = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    state.sessions.logout(refresh_cookie).await;

    (cookies::cleared(jar), StatusCode::OK)
}
