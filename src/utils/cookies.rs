use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::config::JwtConfig;
use crate::services::jwt::SessionTokens;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const CONTROL_COOKIE: &str = "control_token";

/// Attach the session triple to the jar. Access and refresh cookies are
/// HttpOnly; the control cookie is deliberately readable by client script so
/// another tab can tell whether a refresh attempt is worth making.
pub fn with_session(jar: CookieJar, tokens: &SessionTokens, jwt: &JwtConfig) -> CookieJar {
    let access_age = time::Duration::minutes(jwt.access_ttl_minutes);
    let refresh_age = time::Duration::days(jwt.refresh_ttl_days);

    jar.add(
        Cookie::build((ACCESS_COOKIE, tokens.access_token.clone()))
            .path("/")
            .http_only(true)
            .secure(true)
            .max_age(access_age),
    )
    .add(
        Cookie::build((REFRESH_COOKIE, tokens.refresh_token.clone()))
            .path("/")
            .http_only(true)
            .secure(true)
            .max_age(refresh_age),
    )
    .add(
        Cookie::build((CONTROL_COOKIE, tokens.control_token.clone()))
            .path("/")
            .http_only(false)
            .secure(true)
            .max_age(refresh_age),
    )
}

/// Expire all three session cookies immediately.
pub fn cleared(jar: CookieJar) -> CookieJar {
    jar.add(expired(ACCESS_COOKIE, true))
        .add(expired(REFRESH_COOKIE, true))
        .add(expired(CONTROL_COOKIE, false))
}

fn expired(name: &'static str, http_only: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(http_only)
        .secure(true)
        .max_age(time::Duration::ZERO)
        .build()
}
