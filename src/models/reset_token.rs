use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::FromRow;
use uuid::Uuid;

/// Password-reset token. At most one outstanding per user: repeated reset
/// requests reuse the existing row, and a successful restore deletes it.
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub user_id: Uuid,
    pub token: String,
    pub created_utc: DateTime<Utc>,
}

impl ResetToken {
    pub fn new(user_id: Uuid) -> Self {
        let bytes: [u8; 8] = rand::thread_rng().gen();
        Self {
            user_id,
            token: hex::encode(bytes),
            created_utc: Utc::now(),
        }
    }
}
