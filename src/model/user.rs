use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Account record. `password_hash` never leaves the process through a read
/// path, hence the serde skip.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Set together with `reset_expires` while a password reset is pending.
    /// Cleared on a successful confirmation; a new reset request overwrites
    /// any stale pair left behind by an expired token.
    pub reset_token: Option<String>,
    pub reset_expires: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            reset_token: None,
            reset_expires: None,
        }
    }

    /// True while an issued token is still inside its validity window.
    pub fn reset_pending(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, self.reset_expires) {
            (Some(_), Some(expires)) => now < expires,
            _ => false,
        }
    }
}
