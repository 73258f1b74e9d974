//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ProxyConfig, Secret};
use crate::config::validation::{normalize_mount_prefix, validate_config, ValidationError};

pub const ENV_SITE_URL: &str = "WOOCOMMERCE_SITE_URL";
pub const ENV_CONSUMER_KEY: &str = "WOOCOMMERCE_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "WOOCOMMERCE_CONSUMER_SECRET";
pub const ENV_AUTH_POLICY: &str = "WOO_PROXY_AUTH_POLICY";
pub const ENV_BIND_ADDRESS: &str = "WOO_PROXY_BIND_ADDRESS";
pub const ENV_ALLOW_ORIGIN: &str = "WOO_PROXY_ALLOW_ORIGIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid environment variable {var}: {message}")]
    Env { var: &'static str, message: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML configuration file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so callers and tests can supply their own
/// source. Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_SITE_URL) {
        config.upstream.base_url = Some(url);
    }
    if let Some(key) = get(ENV_CONSUMER_KEY) {
        config.auth.consumer_key = Some(key);
    }
    if let Some(secret) = get(ENV_CONSUMER_SECRET) {
        config.auth.consumer_secret = Some(Secret::new(secret));
    }
    if let Some(policy) = get(ENV_AUTH_POLICY) {
        config.auth.policy = policy.parse().map_err(|message| ConfigError::Env {
            var: ENV_AUTH_POLICY,
            message,
        })?;
    }
    if let Some(bind) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }
    if let Some(origin) = get(ENV_ALLOW_ORIGIN) {
        config.cors.allow_origin = origin;
    }
    Ok(())
}

/// Validate and normalize a fully layered configuration.
pub fn finalize(mut config: ProxyConfig) -> Result<ProxyConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    if let Some(prefix) = normalize_mount_prefix(&config.mount.prefix) {
        config.mount.prefix = prefix;
    }
    if let Some(base_url) = config.upstream.base_url.as_mut() {
        let trimmed = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed);
    }
    Ok(config)
}
