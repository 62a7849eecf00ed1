//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use buslink_session::config::build_http_client;
use buslink_session::refresh::AuthApi;
use buslink_session::session::{CredentialStore, TerminationHandler};
use buslink_session::{ApiClient, Config, MemoryCredentialStore, RefreshCoordinator, SessionBridge};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Build an unsigned compact JWT with the given payload.
pub fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.sig")
}

/// Token whose `exp` is `secs` seconds from now. Negative values produce
/// an already-expired token.
pub fn token_expiring_in(secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs;
    token_with_payload(&serde_json::json!({ "exp": exp, "sub": "user-1" }))
}

/// Token without an `exp` claim.
pub fn token_without_exp() -> String {
    token_with_payload(&serde_json::json!({ "sub": "user-1" }))
}

/// Termination handler that counts invocations.
#[derive(Debug, Default)]
pub struct CountingTermination {
    calls: AtomicUsize,
}

impl CountingTermination {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TerminationHandler for CountingTermination {
    async fn on_terminate(&self, _login_entry: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Everything a test needs wired against a mock server.
pub struct Fixture {
    pub config: Config,
    pub store: Arc<MemoryCredentialStore>,
    pub termination: Arc<CountingTermination>,
    pub coordinator: RefreshCoordinator,
}

impl Fixture {
    /// Wire a coordinator against the given mock server URI.
    pub fn new(server_uri: &str) -> Self {
        Self::with_config(Config::new(server_uri).unwrap())
    }

    /// Wire a coordinator from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let store = Arc::new(MemoryCredentialStore::new());
        let termination = Arc::new(CountingTermination::default());

        let http = build_http_client(&config).unwrap();
        let api = AuthApi::new(http, &config).unwrap();
        let bridge = SessionBridge::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            config.login_entry.clone(),
        )
        .with_termination_handler(Arc::clone(&termination) as Arc<dyn TerminationHandler>);
        let coordinator = RefreshCoordinator::new(api, bridge, config.expiry_margin);

        Self {
            config,
            store,
            termination,
            coordinator,
        }
    }

    /// Wire a full API client sharing this fixture's store and
    /// termination counter.
    pub fn api_client(&self) -> ApiClient {
        let bridge = SessionBridge::new(
            Arc::clone(&self.store) as Arc<dyn CredentialStore>,
            self.config.login_entry.clone(),
        )
        .with_termination_handler(
            Arc::clone(&self.termination) as Arc<dyn TerminationHandler>
        );
        ApiClient::new(self.config.clone(), bridge).unwrap()
    }
}

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// JSON body of a successful refresh/login response.
pub fn success_body(access_token: &str, refresh_token: &str) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "accessToken": access_token,
        "refreshToken": refresh_token,
    })
}

/// JSON body of a rejected refresh/login response.
pub fn failure_body(error: &str) -> serde_json::Value {
    serde_json::json!({ "success": false, "error": error })
}
