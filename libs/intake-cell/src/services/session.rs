use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use notification_cell::services::{Mailer, SmtpMailer};
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{WizardSession, WizardStep};

/// In-memory session map. Sessions only live for the length of one
/// wizard walkthrough; abandoning the session is the only cancellation.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, WizardSession>>>,
}

impl SessionStore {
    pub async fn create(&self) -> WizardSession {
        let session = WizardSession::new();
        debug!("Created wizard session: {}", session.id);
        self.inner.write().await.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<WizardSession> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn put(&self, session: WizardSession) {
        self.inner.write().await.insert(session.id, session);
    }

    /// Fetch a session and check it is at the expected step. A session
    /// at the wrong step is a conflict, not a bad request: the wizard
    /// only moves forward.
    pub async fn expect(&self, id: Uuid, step: WizardStep) -> Result<WizardSession, AppError> {
        let session = self
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("unknown session: {}", id)))?;
        if session.step != step {
            return Err(AppError::Conflict(format!(
                "session is at step '{}', expected '{}'",
                session.step, step
            )));
        }
        Ok(session)
    }
}

/// Router state for the wizard: config plus the session map and the
/// mail seam (swapped for a test double in tests).
#[derive(Clone)]
pub struct WizardState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub mailer: Arc<dyn Mailer>,
}

impl WizardState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let mailer = Arc::new(SmtpMailer::new(&config));
        Self::with_mailer(config, mailer)
    }

    pub fn with_mailer(config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            sessions: SessionStore::default(),
            mailer,
        }
    }
}
