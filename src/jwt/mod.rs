//! Unverified JWT payload inspection.
//!
//! The client never verifies signatures (the backend does); it only
//! peeks at the payload to decide whether a token is worth sending.

pub mod claims;
pub mod inspector;

pub use claims::AccessClaims;
pub use inspector::{is_token_expired, is_token_expired_at};
