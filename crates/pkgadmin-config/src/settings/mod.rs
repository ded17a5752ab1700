//! Resolved client settings

use std::fmt;
use std::time::Duration;
use url::Url;

use crate::{ConfigError, ConfigResult};

/// Admin service URL used when nothing else is configured
pub const DEFAULT_WEB_SERVICE_URL: &str = "http://localhost:8080";

/// Everything needed to talk to the admin service
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the admin web service
    pub web_service_url: Url,
    /// Credentials attached to every request
    pub auth: AuthConfig,
    /// Total time allowed for one request, body included
    pub request_timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

/// Authentication configuration for admin service access
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            web_service_url: Url::parse(DEFAULT_WEB_SERVICE_URL).expect("default URL is valid"),
            auth: AuthConfig::default(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("pkgadmin/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 16,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another service URL
    pub fn with_url(url: &str) -> ConfigResult<Self> {
        let config = Self {
            web_service_url: parse_service_url(url)?,
            ..Self::default()
        };
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> ConfigResult<()> {
        check_scheme(&self.web_service_url)?;

        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation("request_timeout", "must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::validation("connect_timeout", "must be greater than zero"));
        }

        self.auth.validate()
    }
}

impl AuthConfig {
    /// Bearer token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Basic auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            token: None,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// True when no credentials are configured
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.username.is_none() && self.password.is_none()
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.token.as_deref() == Some("") {
            return Err(ConfigError::validation("auth.token", "must not be empty"));
        }
        match (&self.username, &self.password) {
            (Some(_), None) => Err(ConfigError::validation(
                "auth.password",
                "required when auth.username is set",
            )),
            (None, Some(_)) => Err(ConfigError::validation(
                "auth.username",
                "required when auth.password is set",
            )),
            _ => Ok(()),
        }
    }
}

// Credentials never end up in logs
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parse and check an admin service URL
pub(crate) fn parse_service_url(value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::validation("web_service_url", format!("'{}': {}", value, e)))?;
    check_scheme(&url)?;
    Ok(url)
}

fn check_scheme(url: &Url) -> ConfigResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::validation(
            "web_service_url",
            format!("unsupported scheme '{}', expected http or https", other),
        )),
    }
}
