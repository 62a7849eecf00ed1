//! Bridge between the coordinator and the session store.

use crate::error::SessionError;
use crate::session::store::{CredentialStore, Credentials};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Receives the session-termination side effect.
///
/// In the web frontend this is a redirect of the user agent to the login
/// entry point; a native host can navigate, re-prompt, or shut down as
/// it sees fit.
#[async_trait]
pub trait TerminationHandler: Send + Sync {
    /// Called after local credentials have been cleared.
    async fn on_terminate(&self, login_entry: &str);
}

/// Default termination handler; records the event and nothing else.
#[derive(Debug, Default)]
pub struct LogTermination;

#[async_trait]
impl TerminationHandler for LogTermination {
    async fn on_terminate(&self, login_entry: &str) {
        warn!(login_entry = %login_entry, "Session terminated");
    }
}

/// Read/write access to the current session plus the termination path.
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn CredentialStore>,
    handler: Arc<dyn TerminationHandler>,
    login_entry: String,
}

impl SessionBridge {
    /// Create a bridge over a credential store with the default
    /// termination handler.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, login_entry: impl Into<String>) -> Self {
        Self {
            store,
            handler: Arc::new(LogTermination),
            login_entry: login_entry.into(),
        }
    }

    /// Replace the termination handler.
    #[must_use]
    pub fn with_termination_handler(mut self, handler: Arc<dyn TerminationHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Read the current credential pair.
    ///
    /// # Errors
    ///
    /// Propagates credential store failures.
    pub async fn current(&self) -> Result<Option<Credentials>, SessionError> {
        self.store.read().await
    }

    /// Persist a refreshed credential pair so it is visible to the next
    /// read.
    ///
    /// # Errors
    ///
    /// Propagates credential store failures.
    pub async fn persist(&self, credentials: Credentials) -> Result<(), SessionError> {
        self.store.write(credentials).await?;
        info!("Persisted refreshed credentials");
        Ok(())
    }

    /// Terminate the session: destroy local credentials and notify the
    /// termination handler with the login entry point.
    ///
    /// Safe to call on an already-terminated session.
    pub async fn terminate(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear credentials during termination");
        }
        self.handler.on_terminate(&self.login_entry).await;
    }
}

impl std::fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge")
            .field("login_entry", &self.login_entry)
            .finish_non_exhaustive()
    }
}
