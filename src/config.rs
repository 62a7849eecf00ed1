//! Centralized configuration for the session client.
//!
//! All settings can be loaded from environment variables with sensible
//! defaults, or adjusted through builder methods. HTTP client
//! construction lives here as well since this crate is its only
//! consumer.

use crate::error::SessionError;
use reqwest::{Client, ClientBuilder};
use std::env;
use std::time::Duration;
use url::Url;

/// Default safety margin before `exp` at which a token counts as expired.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Default deadline for a single refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Session client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the booking API
    pub base_url: Url,
    /// Path of the token refresh endpoint
    pub refresh_path: String,
    /// Path of the login endpoint
    pub login_path: String,
    /// Paths that never receive a bearer token (login, registration)
    pub public_paths: Vec<String>,
    /// Login entry point the user agent is sent to on termination
    pub login_entry: String,
    /// Safety margin before `exp` at which a token counts as expired
    pub expiry_margin: Duration,
    /// Deadline for a single refresh call
    pub refresh_timeout: Duration,
    /// Request timeout for outgoing API calls
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Create a configuration for the given API base URL with defaults
    /// for everything else.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SessionError::config(format!("Invalid base URL {base_url}: {e}")))?;

        Ok(Self {
            base_url,
            refresh_path: "/api/auth/refresh".to_string(),
            login_path: "/api/auth/login".to_string(),
            public_paths: vec![
                "/api/auth/login".to_string(),
                "/api/auth/register".to_string(),
            ],
            login_entry: "/login".to_string(),
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: "buslink-session/0.2".to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// `BUSLINK_API_URL` is required; everything else falls back to the
    /// defaults of [`Config::new`].
    ///
    /// # Errors
    ///
    /// Returns an error if `BUSLINK_API_URL` is missing or any variable
    /// fails to parse.
    pub fn from_env() -> Result<Self, SessionError> {
        dotenvy::dotenv().ok();

        let base_url = env::var("BUSLINK_API_URL")
            .map_err(|_| SessionError::config("BUSLINK_API_URL is not set"))?;
        let mut config = Self::new(&base_url)?;

        if let Ok(path) = env::var("BUSLINK_REFRESH_PATH") {
            config.refresh_path = path;
        }
        if let Ok(path) = env::var("BUSLINK_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Ok(entry) = env::var("BUSLINK_LOGIN_ENTRY") {
            config.login_entry = entry;
        }
        config.expiry_margin = Duration::from_secs(parse_env("BUSLINK_EXPIRY_MARGIN", 300)?);
        config.refresh_timeout = Duration::from_secs(parse_env("BUSLINK_REFRESH_TIMEOUT", 10)?);
        config.request_timeout = Duration::from_secs(parse_env("BUSLINK_REQUEST_TIMEOUT", 30)?);

        Ok(config)
    }

    /// Set the expiry safety margin.
    #[must_use]
    pub const fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    /// Set the refresh call deadline.
    #[must_use]
    pub const fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Set the request timeout for outgoing API calls.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the login entry point used on session termination.
    #[must_use]
    pub fn with_login_entry(mut self, entry: impl Into<String>) -> Self {
        self.login_entry = entry.into();
        self
    }

    /// Set the list of paths that never receive a bearer token.
    #[must_use]
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = paths;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check whether a request path is public (never authenticated).
    #[must_use]
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Resolve a request path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined to the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(path)
            .map_err(|e| SessionError::config(format!("Invalid path {path}: {e}")))
    }
}

/// Build a configured HTTP client.
///
/// Creates a reqwest client with rustls TLS, connection pooling, and the
/// timeouts from the configuration.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn build_http_client(config: &Config) -> Result<Client, SessionError> {
    ClientBuilder::new()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
        .map_err(SessionError::Http)
}

/// Parse environment variable with default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, SessionError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| SessionError::config(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("https://api.buslink.example").unwrap();
        assert_eq!(config.refresh_path, "/api/auth/refresh");
        assert_eq!(config.login_entry, "/login");
        assert_eq!(config.expiry_margin, Duration::from_secs(300));
        assert_eq!(config.refresh_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Config::new("not a url").is_err());
    }

    #[test]
    fn test_builder() {
        let config = Config::new("https://api.buslink.example")
            .unwrap()
            .with_expiry_margin(Duration::from_secs(60))
            .with_login_entry("/signin")
            .with_user_agent("test-agent");

        assert_eq!(config.expiry_margin, Duration::from_secs(60));
        assert_eq!(config.login_entry, "/signin");
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn test_public_path_matching() {
        let config = Config::new("https://api.buslink.example").unwrap();
        assert!(config.is_public_path("/api/auth/login"));
        assert!(config.is_public_path("/api/auth/register"));
        assert!(!config.is_public_path("/api/bookings"));
        assert!(!config.is_public_path("/api/auth/refresh"));
    }

    #[test]
    fn test_endpoint_join() {
        let config = Config::new("https://api.buslink.example").unwrap();
        let url = config.endpoint("/api/trips").unwrap();
        assert_eq!(url.as_str(), "https://api.buslink.example/api/trips");
    }

    #[test]
    fn test_build_client() {
        let config = Config::new("https://api.buslink.example").unwrap();
        assert!(build_http_client(&config).is_ok());
    }
}
