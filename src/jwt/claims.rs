//! Decoded access-token payload.

use crate::error::SessionError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use std::collections::HashMap;

/// Unverified view of an access token's payload.
///
/// Derived on each inspection, never stored. Only the claims this client
/// acts on are modeled; everything else is carried opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// Expiry timestamp, seconds since epoch. Absent in some tokens.
    pub exp: Option<i64>,
    /// Subject (user ID), when present
    pub sub: Option<String>,
    /// Issued-at timestamp, when present
    pub iat: Option<i64>,
    /// Remaining claims, untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl AccessClaims {
    /// Decode the payload segment of a compact JWT without verifying
    /// the signature.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedToken`] if the token does not
    /// have three dot-delimited segments, the payload is not valid
    /// base64url, or the decoded payload is not a JSON object.
    pub fn decode(token: &str) -> Result<Self, SessionError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SessionError::malformed("expected three segments"));
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SessionError::malformed(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::malformed(format!("payload is not a claims object: {e}")))
    }
}
