use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    dtos::user::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest},
    error::AppError,
    middleware::AuthUser,
    models::SanitizedUser,
    utils::ValidatedJson,
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<SanitizedUser>>, AppError> {
    let users = state.accounts.list().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SanitizedUser>, AppError> {
    let user = state.accounts.get(id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<SanitizedUser>), AppError> {
    let user = state.accounts.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<SanitizedUser>, AppError> {
    let user = state.accounts.update(id, req).await?;
    Ok(Json(user))
}

/// Delete a user. The caller's own account is off limits; the identity used
/// for that check is the authenticated one, not anything from the request.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let caller_id = Uuid::parse_str(&caller.0.sub)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("invalid access token")))?;

    state.accounts.delete(caller_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update the logged-in user's own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<SanitizedUser>, AppError> {
    let caller_id = Uuid::parse_str(&caller.0.sub)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("invalid access token")))?;

    let user = state.accounts.update_profile(caller_id, req).await?;
    Ok(Json(user))
}
