//! Session state: credential storage and the termination boundary.

pub mod bridge;
pub mod store;

pub use bridge::{SessionBridge, TerminationHandler};
pub use store::{CredentialStore, Credentials, MemoryCredentialStore};
