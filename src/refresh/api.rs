//! Wire calls against the auth endpoints.
//!
//! These are the low-level requests only: a failed refresh surfaces as
//! an error and nothing more. Deciding whether a failure ends the
//! session is the coordinator's job, not this module's.

use crate::config::Config;
use crate::error::SessionError;
use crate::session::Credentials;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response shape shared by the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Whether the backend accepted the request
    pub success: bool,
    /// New access token, present on success
    pub access_token: Option<String>,
    /// New refresh token; the backend may omit it on refresh
    pub refresh_token: Option<String>,
    /// Backend-provided failure reason
    pub error: Option<String>,
}

/// Client for the auth endpoints of the booking API.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: Client,
    refresh_url: Url,
    login_url: Url,
    refresh_timeout: Duration,
}

impl AuthApi {
    /// Create an auth API client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured paths cannot be resolved
    /// against the base URL.
    pub fn new(http: Client, config: &Config) -> Result<Self, SessionError> {
        Ok(Self {
            http,
            refresh_url: config.endpoint(&config.refresh_path)?,
            login_url: config.endpoint(&config.login_path)?,
            refresh_timeout: config.refresh_timeout,
        })
    }

    /// Exchange a refresh token for a new credential pair.
    ///
    /// Bounded by the configured refresh deadline; a timeout counts as a
    /// refresh failure. When the backend omits a new refresh token, the
    /// presented one is carried forward.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure, non-2xx status,
    /// or a `success: false` response body.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credentials, SessionError> {
        debug!(url = %self.refresh_url, "Requesting token refresh");

        let request = self
            .http
            .post(self.refresh_url.clone())
            .json(&RefreshRequest { refresh_token });

        let response = tokio::time::timeout(self.refresh_timeout, request.send())
            .await
            .map_err(|_| SessionError::RefreshTimeout(self.refresh_timeout))??;

        if !response.status().is_success() {
            return Err(SessionError::rejected(format!(
                "refresh endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        Self::credentials_from(body, Some(refresh_token))
    }

    /// Authenticate with the login endpoint and return the issued
    /// credential pair.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a
    /// `success: false` response body.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, SessionError> {
        debug!(url = %self.login_url, "Requesting login");

        let response = self
            .http
            .post(self.login_url.clone())
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::rejected(format!(
                "login endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await?;
        Self::credentials_from(body, None)
    }

    fn credentials_from(
        body: TokenResponse,
        presented_refresh: Option<&str>,
    ) -> Result<Credentials, SessionError> {
        if !body.success {
            return Err(SessionError::rejected(
                body.error.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        let access_token = body
            .access_token
            .ok_or_else(|| SessionError::rejected("success response without access token"))?;

        let refresh_token = body
            .refresh_token
            .or_else(|| presented_refresh.map(str::to_string))
            .unwrap_or_default();

        Ok(Credentials::new(access_token, refresh_token))
    }
}
