//! Credential pair and the storage boundary.

use crate::error::SessionError;
use async_trait::async_trait;
use tokio::sync::RwLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The session's credential pair.
///
/// Owned by the credential store; replaced only by a successful refresh
/// or login, destroyed on termination. Token material is wiped from
/// memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// Short-lived bearer token attached to API requests
    pub access_token: String,
    /// Longer-lived token used solely to obtain a new access token
    pub refresh_token: String,
}

impl Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Check whether a refresh token is present.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

// Token material stays out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Storage boundary for the session's credential pair.
///
/// Any backing store works (cookie jar, platform secure storage, an
/// external session library) as long as a write is visible to the next
/// read.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the current credential pair, if a session exists.
    async fn read(&self) -> Result<Option<Credentials>, SessionError>;

    /// Persist a new credential pair, replacing any existing one.
    async fn write(&self, credentials: Credentials) -> Result<(), SessionError>;

    /// Destroy the stored credential pair.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// In-process credential store.
///
/// Read-after-write consistent; suitable for native clients and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a credential pair.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn read(&self) -> Result<Option<Credentials>, SessionError> {
        Ok(self.inner.read().await.clone())
    }

    async fn write(&self, credentials: Credentials) -> Result<(), SessionError> {
        *self.inner.write().await = Some(credentials);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = None;
        Ok(())
    }
}
