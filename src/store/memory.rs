//! In-memory store used by the integration tests and for running the
//! service without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{RefreshTokenRecord, ResetToken, User};
use crate::store::{CredentialStore, TokenLedger};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    refresh: Mutex<HashMap<(Uuid, String), RefreshTokenRecord>>,
    resets: Mutex<HashMap<Uuid, ResetToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding refresh-token entries for a user.
    pub fn refresh_count(&self, user_id: Uuid) -> usize {
        self.refresh
            .lock()
            .map(|map| map.keys().filter(|(id, _)| *id == user_id).count())
            .unwrap_or(0)
    }
}

fn poisoned(e: impl std::fmt::Display) -> AppError {
    AppError::InternalError(anyhow::anyhow!("Memory store mutex poisoned: {}", e))
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let login = login.to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .values()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let username = username.to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().map_err(poisoned)?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        let duplicate = users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if duplicate {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "username or email already in use"
            )));
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        if !users.contains_key(&user.user_id) {
            return Err(AppError::NotFound(anyhow::anyhow!("user not found")));
        }
        let duplicate = users.values().any(|u| {
            u.user_id != user.user_id && (u.username == user.username || u.email == user.email)
        });
        if duplicate {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "username or email already in use"
            )));
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_utc = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.lock().map_err(poisoned)?;
        Ok(users.remove(&id).is_some())
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let username = username.to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .values()
            .any(|u| u.username == username && Some(u.user_id) != exclude))
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let email = email.to_lowercase();
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .values()
            .any(|u| u.email == email && Some(u.user_id) != exclude))
    }
}

#[async_trait]
impl TokenLedger for MemoryStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut refresh = self.refresh.lock().map_err(poisoned)?;
        refresh.insert((record.user_id, record.token_id.clone()), record.clone());
        Ok(())
    }

    async fn consume(&self, user_id: Uuid, token_id: &str) -> Result<bool, AppError> {
        // Remove-under-lock: at most one caller sees the live entry.
        let mut refresh = self.refresh.lock().map_err(poisoned)?;
        match refresh.remove(&(user_id, token_id.to_string())) {
            Some(record) => Ok(!record.is_expired()),
            None => Ok(false),
        }
    }

    async fn remove(&self, user_id: Uuid, token_id: &str) -> Result<(), AppError> {
        let mut refresh = self.refresh.lock().map_err(poisoned)?;
        refresh.remove(&(user_id, token_id.to_string()));
        Ok(())
    }

    async fn purge_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut refresh = self.refresh.lock().map_err(poisoned)?;
        let before = refresh.len();
        refresh.retain(|(id, _), _| *id != user_id);
        Ok((before - refresh.len()) as u64)
    }

    async fn find_reset(&self, user_id: Uuid) -> Result<Option<ResetToken>, AppError> {
        let resets = self.resets.lock().map_err(poisoned)?;
        Ok(resets.get(&user_id).cloned())
    }

    async fn insert_reset(&self, token: &ResetToken) -> Result<(), AppError> {
        let mut resets = self.resets.lock().map_err(poisoned)?;
        resets.insert(token.user_id, token.clone());
        Ok(())
    }

    async fn take_reset(&self, user_id: Uuid, token: &str) -> Result<bool, AppError> {
        let mut resets = self.resets.lock().map_err(poisoned)?;
        match resets.get(&user_id) {
            Some(stored) if stored.token == token => {
                resets.remove(&user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
