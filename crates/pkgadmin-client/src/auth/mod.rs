//! Credential decoration for outgoing requests

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use thiserror::Error;

use pkgadmin_config::AuthConfig;

use crate::transport::AdminRequest;

/// Failure to attach credentials to a request
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid {scheme} credentials: {source}")]
    InvalidHeader {
        scheme: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("{0}")]
    Provider(String),
}

/// Attaches credentials to a request before it is submitted
pub trait AuthProvider: Send + Sync {
    fn decorate(&self, request: AdminRequest) -> Result<AdminRequest, AuthError>;
}

/// Sends requests unauthenticated
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn decorate(&self, request: AdminRequest) -> Result<AdminRequest, AuthError> {
        Ok(request)
    }
}

/// `Authorization: Bearer <token>`
#[derive(Clone)]
pub struct TokenAuth {
    token: String,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth").field("token", &"<redacted>").finish()
    }
}

impl AuthProvider for TokenAuth {
    fn decorate(&self, request: AdminRequest) -> Result<AdminRequest, AuthError> {
        let value = sensitive(&format!("Bearer {}", self.token), "token")?;
        Ok(request.with_header(AUTHORIZATION, value))
    }
}

/// `Authorization: Basic base64(username:password)`
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthProvider for BasicAuth {
    fn decorate(&self, request: AdminRequest) -> Result<AdminRequest, AuthError> {
        let encoded = general_purpose::STANDARD.encode(format!("{}:{}", self.username, self.password));
        let value = sensitive(&format!("Basic {}", encoded), "basic")?;
        Ok(request.with_header(AUTHORIZATION, value))
    }
}

fn sensitive(value: &str, scheme: &'static str) -> Result<HeaderValue, AuthError> {
    let mut header = HeaderValue::from_str(value).map_err(|source| AuthError::InvalidHeader { scheme, source })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Pick the provider for the configured credentials; a token wins over basic auth
pub fn from_config(config: &AuthConfig) -> Arc<dyn AuthProvider> {
    if let Some(token) = &config.token {
        return Arc::new(TokenAuth::new(token.clone()));
    }

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        return Arc::new(BasicAuth::new(username.clone(), password.clone()));
    }

    Arc::new(NoAuth)
}
