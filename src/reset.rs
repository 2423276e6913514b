//! Password-reset workflow: token issue, lazy expiry, confirmation.
//!
//! Every step runs as an ordered pipeline (token -> lookup -> mutate ->
//! persist -> mail); the first failure short-circuits the rest and surfaces
//! as exactly one error. A token already persisted when the mail send fails
//! stays issued, so a retried request behaves at-least-once.

use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, rngs::OsRng};
use tracing::{info, warn};

use crate::auth::password;
use crate::error::AppError;
use crate::mail::{self, Mailer};
use crate::model::user::User;
use crate::store::UserStore;

const TOKEN_BYTES: usize = 20;

/// 160-bit random token, hex-encoded.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

pub struct ResetWorkflow<'a> {
    pub users: &'a dyn UserStore,
    pub mailer: &'a dyn Mailer,
    pub ttl_mins: i64,
}

impl ResetWorkflow<'_> {
    /// Issues a fresh token for the account behind `email` and mails the
    /// recovery link. A pending or expired token is overwritten; there is
    /// at most one live token per user.
    pub async fn request(
        &self,
        email: &str,
        host: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let token = generate_token();

        let mut user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        user.reset_token = Some(token.clone());
        user.reset_expires = Some(now + Duration::minutes(self.ttl_mins));
        self.users.save_user(&user).await?;

        info!(email, "reset token issued");

        let (subject, body) = mail::reset_request_email(host, &token);
        if let Err(e) = self.mailer.send(&user.email, &subject, &body).await {
            // The token is already persisted; not rolled back.
            warn!(email, error = %e, "recovery mail failed after token issue");
            return Err(e);
        }

        Ok(token)
    }

    /// Finds the user holding `token` while it is still inside its window.
    /// Expired tokens are discovered here, lazily; they are never purged
    /// proactively.
    pub async fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<User, AppError> {
        let user = self
            .users
            .find_user_by_reset_token(token)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if user.reset_pending(now) {
            Ok(user)
        } else {
            Err(AppError::TokenInvalid)
        }
    }

    /// Re-validates the token, rotates the credential and consumes the
    /// token. Once the new hash is persisted nothing is rolled back, even
    /// if the confirmation mail fails.
    pub async fn confirm(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let mut user = self.validate(token, now).await?;

        if new_password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        user.password_hash = password::hash_password(new_password)?;
        user.reset_token = None;
        user.reset_expires = None;
        self.users.save_user(&user).await?;

        info!(email = %user.email, "password rotated, reset token consumed");

        let (subject, body) = mail::reset_confirmation_email(&user.name, &user.email);
        if let Err(e) = self.mailer.send(&user.email, &subject, &body).await {
            warn!(email = %user.email, error = %e, "confirmation mail failed after rotation");
        }

        Ok(user)
    }
}
