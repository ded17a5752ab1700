//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;
use std::time::Duration;
use camino::Utf8PathBuf;

use crate::settings::{parse_service_url, ClientConfig};
use crate::toml::ConfigToml;
use crate::{ConfigError, ConfigResult};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "PKGADMIN_CONFIG";

/// Prefix shared by all environment overrides
const ENV_PREFIX: &str = "PKGADMIN_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Path given on the command line
    explicit_path: Option<Utf8PathBuf>,
    /// Home directory used for the default config location
    home_dir: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Built-in defaults only
    Defaults,
    /// Configuration file
    File(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine(String),
}

impl ConfigLoader {
    /// Create a loader that looks in the default locations
    pub fn new() -> Self {
        let home_dir = dirs::home_dir().and_then(|home| Utf8PathBuf::try_from(home).ok());
        Self {
            explicit_path: None,
            home_dir,
        }
    }

    /// Use this configuration file instead of searching for one
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Use another home directory for the default location
    pub fn with_home_dir(mut self, home_dir: impl Into<Utf8PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }

    /// Find the configuration file to read.
    ///
    /// Returns the path and whether it was asked for explicitly; explicit
    /// paths must exist, the default `~/.pkgadmin/config.toml` may not.
    pub fn resolve_config_path(&self, env: &HashMap<String, String>) -> Option<(Utf8PathBuf, bool)> {
        if let Some(path) = &self.explicit_path {
            return Some((path.clone(), true));
        }
        if let Some(path) = env.get(CONFIG_PATH_ENV) {
            return Some((Utf8PathBuf::from(path), true));
        }
        self.home_dir
            .as_ref()
            .map(|home| (home.join(".pkgadmin").join("config.toml"), false))
    }

    /// Load configuration using the process environment
    pub fn load(&self, cli_overrides: &HashMap<String, String>) -> ConfigResult<(ClientConfig, Vec<ConfigSource>)> {
        self.load_with(&ConfigLayering::collect_env_overrides(), cli_overrides)
    }

    /// Load configuration from all layers
    pub fn load_with(
        &self,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<(ClientConfig, Vec<ConfigSource>)> {
        let mut sources = Vec::new();

        let file = match self.resolve_config_path(env_overrides) {
            Some((path, explicit)) if explicit || path.exists() => {
                let file = crate::toml::load_from_file(&path)?;
                sources.push(ConfigSource::File(path));
                Some(file)
            },
            _ => None,
        };

        let config = ConfigLayering::merge_configs(file, env_overrides, cli_overrides)?;

        let mut env_keys: Vec<_> = env_overrides
            .keys()
            .filter(|key| ConfigLayering::is_known_env_key(key))
            .cloned()
            .collect();
        env_keys.sort();
        sources.extend(env_keys.into_iter().map(ConfigSource::Environment));

        let mut cli_keys: Vec<_> = cli_overrides.keys().cloned().collect();
        cli_keys.sort();
        sources.extend(cli_keys.into_iter().map(ConfigSource::CommandLine));

        if sources.is_empty() {
            sources.push(ConfigSource::Defaults);
        }

        Ok((config, sources))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLayering {
    /// Merge multiple configuration layers over the defaults
    pub fn merge_configs(
        file: Option<ConfigToml>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<ClientConfig> {
        let mut merged = ClientConfig::default();

        if let Some(file) = file {
            file.apply_to(&mut merged)?;
        }

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut merged, env_overrides)?;

        // Apply CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        merged.validate()?;
        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut ClientConfig, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "PKGADMIN_WEB_SERVICE_URL" => {
                    config.web_service_url = parse_service_url(value)?;
                }
                "PKGADMIN_AUTH_TOKEN" => {
                    config.auth.token = Some(value.clone());
                }
                "PKGADMIN_AUTH_USERNAME" => {
                    config.auth.username = Some(value.clone());
                }
                "PKGADMIN_AUTH_PASSWORD" => {
                    config.auth.password = Some(value.clone());
                }
                "PKGADMIN_REQUEST_TIMEOUT_SECS" => {
                    config.request_timeout = parse_secs(key, value)?;
                }
                "PKGADMIN_CONNECT_TIMEOUT_SECS" => {
                    config.connect_timeout = parse_secs(key, value)?;
                }
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut ClientConfig, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "url" => {
                    config.web_service_url = parse_service_url(value)?;
                }
                "token" => {
                    config.auth.token = Some(value.clone());
                }
                "request-timeout" => {
                    config.request_timeout = parse_secs(key, value)?;
                }
                _ => {
                    // Unknown CLI override, ignore
                }
            }
        }

        Ok(())
    }

    fn is_known_env_key(key: &str) -> bool {
        matches!(
            key,
            "PKGADMIN_WEB_SERVICE_URL"
                | "PKGADMIN_AUTH_TOKEN"
                | "PKGADMIN_AUTH_USERNAME"
                | "PKGADMIN_AUTH_PASSWORD"
                | "PKGADMIN_REQUEST_TIMEOUT_SECS"
                | "PKGADMIN_CONNECT_TIMEOUT_SECS"
        )
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn parse_secs(field: &str, value: &str) -> ConfigResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::validation(field, format!("'{}' is not a number of seconds: {}", value, e)))
}
