use std::sync::Arc;

use crate::config::Config;
use crate::mail::{Mailer, SmtpMailer};
use crate::store::{EmployeeStore, MemStore, UserStore};

/// Shared collaborators injected into every handler.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub employees: Arc<dyn EmployeeStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(MemStore::default());
        Self {
            users: store.clone(),
            employees: store,
            mailer: Arc::new(SmtpMailer::new(config)),
        }
    }
}
