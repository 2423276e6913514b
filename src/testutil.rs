//! Shared fixtures for unit tests: a recording mailer and canned config.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppError;
use crate::mail::Mailer;
use crate::state::AppState;
use crate::store::MemStore;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records outbound mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.sent.lock().expect("mailer lock poisoned").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        session_secret: "test-secret".to_string(),
        session_ttl: 3600,
        smtp_email: "noreply@example.com".to_string(),
        smtp_password: "unused".to_string(),
        smtp_relay: "smtp.example.com".to_string(),
        reset_token_ttl_mins: 30,
    }
}

/// App state over a fresh in-memory store and a recording mailer, with
/// handles to both for assertions.
pub fn test_state() -> (AppState, Arc<MemStore>, Arc<RecordingMailer>) {
    let store = Arc::new(MemStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        users: store.clone(),
        employees: store.clone(),
        mailer: mailer.clone(),
    };
    (state, store, mailer)
}
