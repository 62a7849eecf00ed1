//! Access-token refresh: wire calls and the single-flight coordinator.

pub mod api;
pub mod coordinator;

pub use api::{AuthApi, TokenResponse};
pub use coordinator::RefreshCoordinator;
