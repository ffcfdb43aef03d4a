use std::sync::Arc;

use crate::assignments::AssignmentRepository;
use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::mail::MailClient;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionStore>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn MailClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        assignments: Arc<dyn AssignmentRepository>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn MailClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            assignments,
            identity,
            mailer,
        }
    }
}
