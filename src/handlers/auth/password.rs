use axum::{extract::State, http::StatusCode};

use crate::{
    dtos::auth::{ChangePasswordRequest, ResetRequest, RestoreRequest},
    error::AppError,
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Change the password of the logged-in user. Requires the current password
/// again as a hijacked-session defense.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state.sessions.change_password(&user.0, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request a recovery link by email. Responds with the link itself; this is
/// an internal admin tool, so revealing account existence here is accepted.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetRequest>,
) -> Result<String, AppError> {
    let link = state.sessions.request_password_reset(req).await?;
    Ok(link)
}

/// Redeem a recovery token and set a new password.
pub async fn restore_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RestoreRequest>,
) -> Result<StatusCode, AppError> {
    state.sessions.restore_password(req).await?;
    Ok(StatusCode::NO_CONTENT)
}
