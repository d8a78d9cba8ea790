//! Session lifecycle orchestration: login, refresh rotation, logout and the
//! password flows. All store and codec failures are mapped to the error
//! taxonomy here; nothing below this layer decides an HTTP status.

use std::sync::Arc;
use uuid::Uuid;

use crate::dtos::auth::{ChangePasswordRequest, LoginRequest, ResetRequest, RestoreRequest};
use crate::error::AppError;
use crate::models::{ResetToken, SanitizedUser};
use crate::services::jwt::{AccessTokenClaims, JwtService, SessionTokens, TokenError};
use crate::services::EmailProvider;
use crate::store::{CredentialStore, TokenLedger};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn CredentialStore>,
    ledger: Arc<dyn TokenLedger>,
    jwt: JwtService,
    email: Arc<dyn EmailProvider>,
    admin_url: String,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn TokenLedger>,
        jwt: JwtService,
        email: Arc<dyn EmailProvider>,
        admin_url: String,
    ) -> Self {
        Self {
            users,
            ledger,
            jwt,
            email,
            admin_url,
        }
    }

    /// Authenticate and open a session. Unknown account and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(
        &self,
        req: LoginRequest,
    ) -> Result<(SessionTokens, SanitizedUser), AppError> {
        let user = self
            .users
            .find_by_login(&req.username)
            .await?
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("invalid credentials")))?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AppError::AuthError(anyhow::anyhow!("invalid credentials")))?;

        let tokens = self.jwt.issue_session(&user)?;
        self.ledger.insert(&tokens.record).await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok((tokens, user.sanitized()))
    }

    /// Rotate a refresh token. The ledger consume is the sole correctness
    /// mechanism: of any number of concurrent calls presenting the same
    /// token, at most one passes it.
    pub async fn refresh(
        &self,
        refresh_cookie: Option<String>,
        control_cookie: Option<String>,
    ) -> Result<SessionTokens, AppError> {
        // A missing control cookie means the client already logged itself
        // out (e.g. in another tab). Drop the presented token so the session
        // cannot be resurrected, then report the end of the session.
        if control_cookie.is_none() {
            if let Some(token) = refresh_cookie {
                self.revoke_presented(&token).await;
            }
            return Err(AppError::SessionEnded(anyhow::anyhow!(
                "client logged out; refresh token revoked"
            )));
        }

        let token = refresh_cookie
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("missing refresh token")))?;

        let claims = self.jwt.validate_refresh_token(&token).map_err(|e| {
            match e {
                TokenError::Expired => tracing::debug!("refresh token expired"),
                TokenError::Invalid(ref err) => tracing::debug!(error = %err, "refresh token invalid"),
            }
            AppError::Unauthorized(anyhow::anyhow!("invalid refresh token"))
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("invalid refresh token")))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("unknown user")))?;

        // Single-use rotation: consume the ledger entry or fail. A replayed
        // token (already consumed, revoked, or expired) misses here.
        if !self.ledger.consume(user_id, &claims.jti).await? {
            tracing::warn!(user_id = %user_id, "refresh token not in ledger; possible replay");
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "refresh token no longer valid"
            )));
        }

        let tokens = self.jwt.issue_session(&user)?;
        self.ledger.insert(&tokens.record).await?;

        tracing::info!(user_id = %user.user_id, "Session refreshed");

        Ok(tokens)
    }

    /// End a session. Best-effort only: this never fails, whatever state the
    /// presented cookie is in.
    pub async fn logout(&self, refresh_cookie: Option<String>) {
        if let Some(token) = refresh_cookie {
            self.revoke_presented(&token).await;
        }
    }

    /// Decode a presented refresh token and drop its ledger entry, ignoring
    /// every failure along the way.
    async fn revoke_presented(&self, token: &str) {
        let claims = match self.jwt.validate_refresh_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable refresh token");
                return;
            }
        };

        let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
            return;
        };

        if let Err(e) = self.ledger.remove(user_id, &claims.jti).await {
            tracing::debug!(error = %e, "failed to drop refresh token entry");
        } else {
            tracing::info!(user_id = %user_id, "Refresh token revoked");
        }
    }

    /// Change the password of the authenticated user. The old password is
    /// re-verified first; all other sessions are revoked on success.
    pub async fn change_password(
        &self,
        claims: &AccessTokenClaims,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("invalid access token")))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("user not found")))?;

        verify_password(
            &Password::new(req.old_password),
            &PasswordHashString::new(user.password_hash.clone()),
        )
        .map_err(|_| AppError::NotFound(anyhow::anyhow!("current password mismatch")))?;

        let hash = hash_password(&Password::new(req.new_password))?;
        self.users
            .update_password(user_id, hash.as_str())
            .await?;

        let revoked = self.ledger.purge_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Password changed, sessions revoked");

        Ok(())
    }

    /// Build (or reuse) the recovery token for a user and dispatch the link
    /// through the notification gateway. Returns the link.
    pub async fn request_password_reset(&self, req: ResetRequest) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("user not found")))?;

        // Idempotent: a second request before the first restore reuses the
        // outstanding token.
        let reset = match self.ledger.find_reset(user.user_id).await? {
            Some(existing) => existing,
            None => {
                let created = ResetToken::new(user.user_id);
                self.ledger.insert_reset(&created).await?;
                created
            }
        };

        let link = format!(
            "{}/resetpass/{}/{}",
            self.admin_url, user.username, reset.token
        );

        self.email
            .send_password_reset(&user.email, &user.username, &link)
            .await?;

        tracing::info!(user_id = %user.user_id, "Password reset requested");

        Ok(link)
    }

    /// Redeem a recovery token. The token is consumed atomically first, so
    /// it can be used exactly once.
    pub async fn restore_password(&self, req: RestoreRequest) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("invalid restore token")))?;

        if !self.ledger.take_reset(user.user_id, &req.token).await? {
            return Err(AppError::AuthError(anyhow::anyhow!(
                "invalid restore token"
            )));
        }

        let hash = hash_password(&Password::new(req.password))?;
        self.users
            .update_password(user.user_id, hash.as_str())
            .await?;

        let revoked = self.ledger.purge_user(user.user_id).await?;
        tracing::info!(user_id = %user.user_id, revoked, "Password restored, sessions revoked");

        Ok(())
    }
}
