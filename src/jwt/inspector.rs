//! Access-token expiry policy.

use crate::jwt::claims::AccessClaims;
use std::time::Duration;

/// Check whether an access token should be treated as expired, using the
/// current wall-clock time.
///
/// Policy:
/// - an empty token is expired (nothing to send);
/// - a token whose payload cannot be decoded is expired (an unparseable
///   token cannot be trusted);
/// - a token without an `exp` claim is **not** expired. This mirrors the
///   backend's observed issuance behaviour and is relied upon by
///   long-lived service tokens; do not tighten it without coordinating
///   with the API team;
/// - otherwise the token is expired once `exp` is within `margin`
///   seconds of now (inclusive), so refresh happens proactively instead
///   of racing the deadline.
#[must_use]
pub fn is_token_expired(token: &str, margin: Duration) -> bool {
    is_token_expired_at(token, margin, chrono::Utc::now().timestamp())
}

/// Clock-injectable variant of [`is_token_expired`].
#[must_use]
pub fn is_token_expired_at(token: &str, margin: Duration, now: i64) -> bool {
    if token.is_empty() {
        return true;
    }

    let claims = match AccessClaims::decode(token) {
        Ok(claims) => claims,
        Err(_) => return true,
    };

    match claims.exp {
        Some(exp) => exp <= now.saturating_add(margin.as_secs() as i64),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    const MARGIN: Duration = Duration::from_secs(300);
    const NOW: i64 = 1_700_000_000;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_empty_token_is_expired() {
        assert!(is_token_expired_at("", MARGIN, NOW));
    }

    #[test]
    fn test_malformed_token_is_expired() {
        assert!(is_token_expired_at("garbage", MARGIN, NOW));
        assert!(is_token_expired_at("a.!!!.c", MARGIN, NOW));
    }

    #[test]
    fn test_missing_exp_is_trusted() {
        let token = token_with_payload(&serde_json::json!({"sub": "user-1"}));
        assert!(!is_token_expired_at(&token, MARGIN, NOW));
    }

    #[test]
    fn test_future_token_is_valid() {
        let token = token_with_payload(&serde_json::json!({"exp": NOW + 301}));
        assert!(!is_token_expired_at(&token, MARGIN, NOW));
    }

    #[test]
    fn test_margin_boundary_is_inclusive() {
        let at_margin = token_with_payload(&serde_json::json!({"exp": NOW + 300}));
        assert!(is_token_expired_at(&at_margin, MARGIN, NOW));

        let within_margin = token_with_payload(&serde_json::json!({"exp": NOW + 100}));
        assert!(is_token_expired_at(&within_margin, MARGIN, NOW));
    }

    #[test]
    fn test_past_token_is_expired() {
        let token = token_with_payload(&serde_json::json!({"exp": NOW - 1}));
        assert!(is_token_expired_at(&token, MARGIN, NOW));
    }
}
