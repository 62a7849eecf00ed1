//! Buslink session client library.
//!
//! Client-side session and token management for the Buslink booking API:
//! unverified JWT expiry inspection, single-flight access-token refresh,
//! a pluggable credential store, and an HTTP client that attaches bearer
//! tokens and retries a 401 exactly once before terminating the session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod refresh;
pub mod session;

// Re-exports for convenience
pub use client::ApiClient;
pub use config::Config;
pub use error::SessionError;
pub use refresh::RefreshCoordinator;
pub use session::{CredentialStore, Credentials, MemoryCredentialStore, SessionBridge};
