//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and header values before the server starts
//! - Normalize the mount prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Missing credentials are not a validation failure; they surface per request
//!   as a configuration error so the process keeps serving
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),
    #[error("upstream.base_url '{0}' is not an http(s) URL without query or fragment")]
    BaseUrl(String),
    #[error("upstream.api_path must not be empty")]
    EmptyApiPath,
    #[error("mount.prefix '{0}' must start with '/' and name at least one segment")]
    MountPrefix(String),
    #[error("cors.allow_origin is not a valid header value")]
    AllowOrigin,
    #[error("limits.max_body_size must be greater than zero")]
    MaxBodySize,
    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Validate a loaded configuration, collecting every problem.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Some(base_url) = &config.upstream.base_url {
        let valid = Url::parse(base_url)
            .map(|u| {
                matches!(u.scheme(), "http" | "https")
                    && u.has_host()
                    && u.query().is_none()
                    && u.fragment().is_none()
            })
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::BaseUrl(base_url.clone()));
        }
    }

    if config.upstream.api_path.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyApiPath);
    }

    if normalize_mount_prefix(&config.mount.prefix).is_none() {
        errors.push(ValidationError::MountPrefix(config.mount.prefix.clone()));
    }

    if HeaderValue::from_str(&config.cors.allow_origin).is_err() {
        errors.push(ValidationError::AllowOrigin);
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::MaxBodySize);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Canonical form of a mount prefix: leading slash, no trailing slash.
///
/// Returns `None` for prefixes that would not form a usable route
/// (root, relative, or containing route-pattern characters).
pub fn normalize_mount_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        return None;
    }
    if stripped
        .chars()
        .any(|c| matches!(c, '{' | '}' | '*' | '?' | '#') || c.is_whitespace())
    {
        return None;
    }
    if stripped.contains("//") {
        return None;
    }
    Some(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.upstream.base_url = Some("ftp://shop.example.com".into());
        config.upstream.api_path = "/".into();
        config.mount.prefix = "api".into();
        config.limits.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyApiPath));
        assert!(errors.contains(&ValidationError::MaxBodySize));
    }

    #[test]
    fn test_base_url_with_query_or_fragment_is_rejected() {
        for base_url in [
            "https://shop.example.com/?lang=en",
            "https://shop.example.com/store?",
            "https://shop.example.com/#top",
        ] {
            let mut config = ProxyConfig::default();
            config.upstream.base_url = Some(base_url.into());
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::BaseUrl(base_url.into())])
            );
        }

        let mut config = ProxyConfig::default();
        config.upstream.base_url = Some("https://shop.example.com/store/".into());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("nope".into())])
        );
    }

    #[test]
    fn test_normalize_mount_prefix() {
        assert_eq!(normalize_mount_prefix("/api/proxy"), Some("/api/proxy".into()));
        assert_eq!(normalize_mount_prefix("/api/proxy/"), Some("/api/proxy".into()));
        assert_eq!(normalize_mount_prefix("/"), None);
        assert_eq!(normalize_mount_prefix("api/proxy"), None);
        assert_eq!(normalize_mount_prefix("/api/{*rest}"), None);
        assert_eq!(normalize_mount_prefix("/api//proxy"), None);
    }
}
