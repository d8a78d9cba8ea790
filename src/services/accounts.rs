//! User-management orchestration for the admin surface.

use std::sync::Arc;
use uuid::Uuid;

use crate::dtos::user::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest};
use crate::error::AppError;
use crate::models::{Role, SanitizedUser, User};
use crate::store::{CredentialStore, TokenLedger};
use crate::utils::{hash_password, Password};

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn CredentialStore>,
    ledger: Arc<dyn TokenLedger>,
}

impl AccountService {
    pub fn new(users: Arc<dyn CredentialStore>, ledger: Arc<dyn TokenLedger>) -> Self {
        Self { users, ledger }
    }

    pub async fn list(&self) -> Result<Vec<SanitizedUser>, AppError> {
        let users = self.users.list().await?;
        Ok(users.iter().map(User::sanitized).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<SanitizedUser, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("user not found")))?;
        Ok(user.sanitized())
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<SanitizedUser, AppError> {
        let role: Role = req
            .role
            .parse()
            .map_err(|e: String| AppError::BadRequest(anyhow::anyhow!(e)))?;

        // Friendly duplicate checks; the store's unique indexes close the
        // race at save time.
        self.ensure_unique(&req.username, &req.email, None).await?;

        let hash = hash_password(&Password::new(req.password))?;
        let user = User::new(
            req.first_name,
            req.last_name,
            req.username,
            req.email,
            hash.into_string(),
            role,
        );

        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User created");

        Ok(user.sanitized())
    }

    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<SanitizedUser, AppError> {
        let role: Role = req
            .role
            .parse()
            .map_err(|e: String| AppError::BadRequest(anyhow::anyhow!(e)))?;

        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("user not found")))?;

        self.ensure_unique(&req.username, &req.email, Some(id)).await?;

        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.username = req.username.to_lowercase();
        user.email = req.email.to_lowercase();
        user.role = role.as_str().to_string();
        if let Some(password) = req.password {
            user.password_hash = hash_password(&Password::new(password))?.into_string();
        }
        user.updated_utc = chrono::Utc::now();

        self.users.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "User updated");

        Ok(user.sanitized())
    }

    /// Self-service profile edit: identity fields only.
    pub async fn update_profile(
        &self,
        id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<SanitizedUser, AppError> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("user not found")))?;

        self.ensure_unique(&req.username, &req.email, Some(id)).await?;

        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.username = req.username.to_lowercase();
        user.email = req.email.to_lowercase();
        user.updated_utc = chrono::Utc::now();

        self.users.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user.sanitized())
    }

    /// Delete a user. The caller identity comes from the validated access
    /// token, never from request input; deleting yourself is a conflict.
    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if caller_id == id {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "cannot delete the current user"
            )));
        }

        if !self.users.delete(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("user not found")));
        }

        // Drop any sessions the deleted account still had open.
        self.ledger.purge_user(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    async fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), AppError> {
        if self.users.username_taken(username, exclude).await? {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "username already in use"
            )));
        }
        if self.users.email_taken(email, exclude).await? {
            return Err(AppError::Conflict(anyhow::anyhow!("email already in use")));
        }
        Ok(())
    }
}
