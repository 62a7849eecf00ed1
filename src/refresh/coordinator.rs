//! Single-flight refresh coordination.
//!
//! At most one refresh call is in flight at any time. Every caller that
//! needs a token while a refresh is outstanding awaits the same shared
//! operation and observes the same result; the in-flight slot is cleared
//! unconditionally when the operation settles so a later caller can
//! start a new attempt.

use crate::error::SessionError;
use crate::jwt::is_token_expired;
use crate::refresh::api::AuthApi;
use crate::session::{Credentials, SessionBridge};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

type InflightRefresh = Shared<BoxFuture<'static, Option<String>>>;

struct Inner {
    api: AuthApi,
    bridge: SessionBridge,
    expiry_margin: Duration,
    inflight: Mutex<Option<InflightRefresh>>,
}

/// Deduplicates concurrent refresh attempts into one shared operation.
///
/// Cheap to clone; clones share the same in-flight state. Tests can
/// instantiate independent coordinators instead of relying on global
/// state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Create a coordinator over an auth API client and a session
    /// bridge.
    #[must_use]
    pub fn new(api: AuthApi, bridge: SessionBridge, expiry_margin: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                bridge,
                expiry_margin,
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Return an access token that is currently safe to send, refreshing
    /// it first if needed.
    ///
    /// - joins an in-flight refresh instead of starting a second one;
    /// - returns the stored token without any network call when it is
    ///   not expired;
    /// - terminates the session and returns `None` when the token is
    ///   expired and no refresh token exists, or when the refresh fails.
    pub async fn valid_access_token(&self) -> Option<String> {
        if let Some(pending) = self.pending_refresh() {
            return pending.await;
        }

        let credentials = match self.inner.bridge.current().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        if credentials.access_token.is_empty() {
            return None;
        }

        if !is_token_expired(&credentials.access_token, self.inner.expiry_margin) {
            return Some(credentials.access_token.clone());
        }

        if !credentials.has_refresh_token() {
            warn!("Access token expired with no refresh token, terminating session");
            self.inner.bridge.terminate().await;
            return None;
        }

        let refresh_token = credentials.refresh_token.clone();

        // The slot is filled under the lock, before any await, so a
        // second caller cannot install a competing refresh.
        let shared = {
            let mut slot = lock_slot(&self.inner.inflight);
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let fut = Self::run_refresh(Arc::clone(&self.inner), refresh_token)
                        .boxed()
                        .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        shared.await
    }

    /// Refresh unconditionally, bypassing both the expiry check and the
    /// single-flight deduplication.
    ///
    /// Used for explicit manual refresh flows. Never terminates the
    /// session; a failure simply yields `None`.
    pub async fn force_refresh(&self) -> Option<String> {
        let credentials = match self.inner.bridge.current().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        if !credentials.has_refresh_token() {
            return None;
        }

        match self.inner.api.refresh(&credentials.refresh_token).await {
            Ok(refreshed) => {
                let token = refreshed.access_token.clone();
                self.persist(refreshed).await;
                info!("Access token force-refreshed");
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "Forced token refresh failed");
                None
            }
        }
    }

    /// Authenticate against the login endpoint and store the issued
    /// credential pair.
    ///
    /// # Errors
    ///
    /// Propagates login failures; the session is left untouched on
    /// error.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let credentials = self.inner.api.login(email, password).await?;
        self.inner.bridge.persist(credentials).await?;
        info!("Login succeeded");
        Ok(())
    }

    /// Check whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        lock_slot(&self.inner.inflight).is_some()
    }

    /// The session bridge this coordinator operates on.
    #[must_use]
    pub fn bridge(&self) -> &SessionBridge {
        &self.inner.bridge
    }

    fn pending_refresh(&self) -> Option<InflightRefresh> {
        lock_slot(&self.inner.inflight).clone()
    }

    async fn run_refresh(inner: Arc<Inner>, refresh_token: String) -> Option<String> {
        let token = match inner.api.refresh(&refresh_token).await {
            Ok(refreshed) => {
                let token = refreshed.access_token.clone();
                if let Err(e) = inner.bridge.persist(refreshed).await {
                    warn!(error = %e, "Failed to persist refreshed credentials");
                }
                info!("Access token refreshed");
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, terminating session");
                inner.bridge.terminate().await;
                None
            }
        };

        // Clear the slot whatever the outcome, so the next expired
        // token starts a new attempt.
        lock_slot(&inner.inflight).take();
        token
    }

    async fn persist(&self, credentials: Credentials) {
        if let Err(e) = self.inner.bridge.persist(credentials).await {
            warn!(error = %e, "Failed to persist refreshed credentials");
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("expiry_margin", &self.inner.expiry_margin)
            .field("is_refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

fn lock_slot(slot: &Mutex<Option<InflightRefresh>>) -> std::sync::MutexGuard<'_, Option<InflightRefresh>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
