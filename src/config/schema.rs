//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::Deserialize;

/// Default WooCommerce REST API path segment.
pub const DEFAULT_API_PATH: &str = "wp-json/wc/v3";

/// Default mount prefix the forwarder is reachable under.
pub const DEFAULT_MOUNT_PREFIX: &str = "/api/proxy";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream WooCommerce store.
    pub upstream: UpstreamConfig,

    /// Authentication policy and server-held credentials.
    pub auth: AuthConfig,

    /// Where the forwarder is mounted on the inbound side.
    pub mount: MountConfig,

    /// CORS response headers.
    pub cors: CorsConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Store base URL (e.g., "https://shop.example.com").
    ///
    /// Left unset, every forwarded request fails with a configuration error.
    pub base_url: Option<String>,

    /// REST API path segment appended to the base URL.
    pub api_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_path: DEFAULT_API_PATH.to_string(),
        }
    }
}

/// Which side owns the WooCommerce credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthPolicy {
    /// The caller sends its own Authorization header, forwarded verbatim.
    #[default]
    Passthrough,
    /// The proxy holds the consumer key/secret and injects them.
    ServerCredentials,
}

impl AuthPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthPolicy::Passthrough => "passthrough",
            AuthPolicy::ServerCredentials => "server_credentials",
        }
    }
}

impl std::str::FromStr for AuthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" => Ok(AuthPolicy::Passthrough),
            "server_credentials" | "server-credentials" => Ok(AuthPolicy::ServerCredentials),
            other => Err(format!(
                "unknown auth policy '{}' (expected 'passthrough' or 'server_credentials')",
                other
            )),
        }
    }
}

/// How server-held credentials are attached to the upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPlacement {
    /// `Authorization: Basic base64(key:secret)`.
    #[default]
    Basic,
    /// `consumer_key` / `consumer_secret` query parameters.
    Query,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Active policy for this deployment.
    pub policy: AuthPolicy,

    /// Placement of server credentials (server_credentials policy only).
    pub placement: CredentialPlacement,

    /// WooCommerce consumer key.
    pub consumer_key: Option<String>,

    /// WooCommerce consumer secret.
    pub consumer_secret: Option<Secret>,
}

/// Mount configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Path prefix stripped before forming the upstream path.
    pub prefix: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_MOUNT_PREFIX.to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A credential value that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Only the credential injector should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.api_path, DEFAULT_API_PATH);
        assert_eq!(config.mount.prefix, DEFAULT_MOUNT_PREFIX);
        assert_eq!(config.auth.policy, AuthPolicy::Passthrough);
        assert_eq!(config.cors.allow_origin, "*");
        assert!(config.upstream.base_url.is_none());
    }

    #[test]
    fn test_full_toml() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [upstream]
            base_url = "https://shop.example.com"

            [auth]
            policy = "server_credentials"
            placement = "query"
            consumer_key = "ck_live"
            consumer_secret = "cs_live"

            [observability]
            log_format = "json"
        "#;
        let config: ProxyConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.auth.policy, AuthPolicy::ServerCredentials);
        assert_eq!(config.auth.placement, CredentialPlacement::Query);
        assert_eq!(config.auth.consumer_secret.as_ref().map(Secret::expose), Some("cs_live"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let mut config = ProxyConfig::default();
        config.auth.consumer_secret = Some(Secret::new("cs_super_secret"));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("cs_super_secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_auth_policy_from_str() {
        assert_eq!("passthrough".parse::<AuthPolicy>(), Ok(AuthPolicy::Passthrough));
        assert_eq!(
            "Server-Credentials".parse::<AuthPolicy>(),
            Ok(AuthPolicy::ServerCredentials)
        );
        assert!("both".parse::<AuthPolicy>().is_err());
    }
}
