//! `config.toml` parsing and serialization

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::settings::{parse_service_url, ClientConfig};
use crate::{ConfigError, ConfigResult};

/// Contents of a pkgadmin configuration file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Base URL of the admin web service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_service_url: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Connect timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_max_idle_per_host: Option<usize>,

    /// Credentials section
    #[serde(default)]
    pub auth: AuthSection,
}

/// `[auth]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ConfigToml {
    /// Overlay the values present in this file onto `config`
    pub fn apply_to(&self, config: &mut ClientConfig) -> ConfigResult<()> {
        if let Some(url) = &self.web_service_url {
            config.web_service_url = parse_service_url(url)?;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(idle) = self.pool_max_idle_per_host {
            config.pool_max_idle_per_host = idle;
        }
        if let Some(token) = &self.auth.token {
            config.auth.token = Some(token.clone());
        }
        if let Some(username) = &self.auth.username {
            config.auth.username = Some(username.clone());
        }
        if let Some(password) = &self.auth.password {
            config.auth.password = Some(password.clone());
        }
        Ok(())
    }
}

/// Parse TOML string to a configuration file
pub fn parse_config_toml(content: &str, path: &str) -> ConfigResult<ConfigToml> {
    ::toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_column(content, span.start))
            .unwrap_or((0, 0));
        ConfigError::TomlParse {
            path: path.to_string(),
            message: e.message().to_string(),
            line,
            column,
        }
    })
}

/// Serialize a configuration file back to TOML
pub fn serialize_config_toml(config: &ConfigToml) -> ConfigResult<String> {
    ::toml::to_string_pretty(config)
        .map_err(|e| ConfigError::validation("config", format!("TOML serialization error: {}", e)))
}

/// Load and parse a configuration file
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<ConfigToml> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        message: format!("Failed to read {}", path),
        source: e,
    })?;

    parse_config_toml(&content, path.as_str())
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}
