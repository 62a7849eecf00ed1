//! Authenticated HTTP client for the booking API.
//!
//! Plays the role of the request/response interceptor pair: every
//! non-public request gets a valid bearer token attached, and a 401 is
//! retried exactly once with a freshly-obtained token before the session
//! is terminated. Non-401 outcomes pass through untouched.

use crate::config::{build_http_client, Config};
use crate::error::SessionError;
use crate::refresh::{AuthApi, RefreshCoordinator};
use crate::session::SessionBridge;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// HTTP client for the booking API with automatic bearer attachment and
/// single 401 retry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: Config,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client from a configuration and a session bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the
    /// configured endpoints are invalid.
    pub fn new(config: Config, bridge: SessionBridge) -> Result<Self, SessionError> {
        let http = build_http_client(&config)?;
        let api = AuthApi::new(http.clone(), &config)?;
        let coordinator = RefreshCoordinator::new(api, bridge, config.expiry_margin);

        Ok(Self {
            http,
            config,
            coordinator,
        })
    }

    /// The refresh coordinator backing this client.
    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Authenticate and store the issued credential pair.
    ///
    /// # Errors
    ///
    /// Propagates login failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        self.coordinator.login(email, password).await
    }

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns transport errors as-is and [`SessionError::Unauthorized`]
    /// when a 401 survives the single retry.
    pub async fn get(&self, path: &str) -> Result<Response, SessionError> {
        let url = self.config.endpoint(path)?;
        self.dispatch(self.http.get(url), path).await
    }

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns transport errors as-is and [`SessionError::Unauthorized`]
    /// when a 401 survives the single retry.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, SessionError> {
        let url = self.config.endpoint(path)?;
        self.dispatch(self.http.post(url).json(body), path).await
    }

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns transport errors as-is and [`SessionError::Unauthorized`]
    /// when a 401 survives the single retry.
    pub async fn delete(&self, path: &str) -> Result<Response, SessionError> {
        let url = self.config.endpoint(path)?;
        self.dispatch(self.http.delete(url), path).await
    }

    /// Send a request, attaching a bearer token for non-public paths and
    /// retrying a 401 exactly once with a fresh token.
    async fn dispatch(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<Response, SessionError> {
        let request = request.header("x-request-id", Uuid::new_v4().to_string());
        let authenticated = !self.config.is_public_path(path);

        // Clone before the bearer header goes on, so the retry can carry
        // a different token without stacking Authorization headers.
        let retry = request.try_clone();

        let request = if authenticated {
            match self.coordinator.valid_access_token().await {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        } else {
            request
        };

        let response = request.send().await?;
        if !authenticated || response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %path, "Received 401, retrying once with a fresh token");

        // Requests with streaming bodies cannot be replayed.
        let Some(retry) = retry else {
            self.coordinator.bridge().terminate().await;
            return Err(SessionError::Unauthorized {
                path: path.to_string(),
            });
        };

        let Some(token) = self.coordinator.valid_access_token().await else {
            warn!(path = %path, "No token available for 401 retry, terminating session");
            self.coordinator.bridge().terminate().await;
            return Err(SessionError::Unauthorized {
                path: path.to_string(),
            });
        };

        let response = retry.bearer_auth(token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %path, "Retry rejected with 401, terminating session");
            self.coordinator.bridge().terminate().await;
            return Err(SessionError::Unauthorized {
                path: path.to_string(),
            });
        }

        Ok(response)
    }
}
