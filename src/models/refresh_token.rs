use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One outstanding refresh-token identifier in the ledger. A user may hold
/// several rows at once (one per device/session). The row is deleted by the
/// refresh call that consumes it, by logout, or implicitly ignored once
/// `expires_utc` has passed.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    /// Opaque identifier embedded in the signed refresh token (jti claim).
    pub token_id: String,
    pub expires_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Create a record with a fresh random identifier.
    pub fn new(user_id: Uuid, expires_in_days: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            token_id: Uuid::new_v4().to_string(),
            expires_utc: now + Duration::days(expires_in_days),
            created_utc: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_utc
    }
}
