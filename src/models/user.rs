//! User model - admin-panel accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account roles. New roles are added here and granted routes in the
/// router; role strings in stored rows and token claims must parse back
/// into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Capability check: is this role in the allow-list?
    pub fn authorized(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity. `username` and `email` are stored lowercased and are
/// globally unique (case-insensitive).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        username: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            first_name,
            last_name,
            username: username.to_lowercase(),
            email: email.to_lowercase(),
            password_hash,
            role: role.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        }
    }

    /// Derived display name, "Last, First". Never stored.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Convert to sanitized response (no password hash).
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// User shape for API responses (without sensitive fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_derives_from_parts() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
            Role::Admin,
        );
        assert_eq!(user.full_name(), "Lovelace, Ada");
    }

    #[test]
    fn username_and_email_are_lowercased() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "AdaL".to_string(),
            "Ada@Example.COM".to_string(),
            "hash".to_string(),
            Role::User,
        );
        assert_eq!(user.username, "adal");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn sanitized_has_no_password_hash() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada".to_string(),
            "ada@example.com".to_string(),
            "secret-hash".to_string(),
            Role::Admin,
        );
        let json = serde_json::to_value(user.sanitized()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn role_capability_check() {
        assert!(Role::Admin.authorized(&[Role::Admin]));
        assert!(!Role::User.authorized(&[Role::Admin]));
        assert!(Role::User.authorized(&[Role::Admin, Role::User]));
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }
}
