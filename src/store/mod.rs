//! Storage seams for the credential store and the token ledger.
//!
//! The service layer only sees these traits; production wires in [`PgStore`]
//! and the tests (or a local dev run without Postgres) use [`MemoryStore`].

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{RefreshTokenRecord, ResetToken, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// User records: lookups, mutation, and uniqueness checks.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find by username OR email, case-insensitive. Used by login.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Insert a new user. Duplicate username/email surfaces as `Conflict`.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite an existing user row. Duplicate username/email surfaces as
    /// `Conflict`; a missing row as `NotFound`.
    async fn update(&self, user: &User) -> Result<(), AppError>;

    /// Returns false when the user does not exist.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError>;

    /// Returns false when the user does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Uniqueness probes for friendly conflict errors before saving.
    /// `exclude` skips the row being edited.
    async fn username_taken(&self, username: &str, exclude: Option<Uuid>)
        -> Result<bool, AppError>;

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AppError>;
}

/// Outstanding refresh-token identifiers plus password-reset tokens.
///
/// `consume` and `take_reset` are the concurrency-critical primitives: each
/// must be a single conditional delete-and-report so that two concurrent
/// calls for the same identity never both observe success.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    /// Atomically delete the entry keyed by `(user_id, token_id)` if it is
    /// still live (`expires > now`). Returns whether a live entry existed.
    async fn consume(&self, user_id: Uuid, token_id: &str) -> Result<bool, AppError>;

    /// Targeted removal on logout. Removing an absent entry is not an error.
    async fn remove(&self, user_id: Uuid, token_id: &str) -> Result<(), AppError>;

    /// Revoke every outstanding session of a user. Returns the count removed.
    async fn purge_user(&self, user_id: Uuid) -> Result<u64, AppError>;

    async fn find_reset(&self, user_id: Uuid) -> Result<Option<ResetToken>, AppError>;

    async fn insert_reset(&self, token: &ResetToken) -> Result<(), AppError>;

    /// Atomically delete the reset token if it matches exactly (value and
    /// ownership). Returns whether it matched; a second take always misses.
    async fn take_reset(&self, user_id: Uuid, token: &str) -> Result<bool, AppError>;
}
