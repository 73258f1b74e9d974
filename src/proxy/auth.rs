//! Authentication injection.
//!
//! One policy is active per deployment:
//! - `Passthrough`: the caller's `Authorization` header is forwarded verbatim;
//!   requests without one are rejected before any upstream call.
//! - `Server`: credentials held by the proxy replace whatever the caller sent,
//!   either as a Basic header or as `consumer_key`/`consumer_secret` query
//!   parameters.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::config::{AuthConfig, AuthPolicy, CredentialPlacement, Secret};
use crate::proxy::error::{ConfigurationError, ProxyError};

/// Resolved authentication policy.
#[derive(Debug, Clone)]
pub enum Authenticator {
    Passthrough,
    Server(ServerCredentials),
}

/// Consumer key/secret held server-side.
#[derive(Clone)]
pub struct ServerCredentials {
    consumer_key: String,
    consumer_secret: Secret,
    placement: CredentialPlacement,
    basic: HeaderValue,
}

impl std::fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &self.consumer_secret)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Resolve the configured policy, reporting the names of missing settings.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, ConfigurationError> {
        match auth.policy {
            AuthPolicy::Passthrough => Ok(Authenticator::Passthrough),
            AuthPolicy::ServerCredentials => {
                let key = auth.consumer_key.as_deref().filter(|k| !k.is_empty());
                let secret = auth.consumer_secret.as_ref().filter(|s| !s.is_empty());

                let (key, secret) = match (key, secret) {
                    (Some(key), Some(secret)) => (key, secret),
                    (key, secret) => {
                        let mut missing = Vec::new();
                        if key.is_none() {
                            missing.push("auth.consumer_key");
                        }
                        if secret.is_none() {
                            missing.push("auth.consumer_secret");
                        }
                        return Err(ConfigurationError { missing });
                    }
                };

                Ok(Authenticator::Server(ServerCredentials::new(
                    key,
                    secret.clone(),
                    auth.placement,
                )))
            }
        }
    }

    pub fn policy(&self) -> AuthPolicy {
        match self {
            Authenticator::Passthrough => AuthPolicy::Passthrough,
            Authenticator::Server(_) => AuthPolicy::ServerCredentials,
        }
    }

    /// Attach credentials to the outgoing request.
    ///
    /// `inbound` holds the caller's headers; `url` and `outbound` describe the
    /// upstream request being built.
    pub fn apply(
        &self,
        inbound: &HeaderMap,
        url: &mut Url,
        outbound: &mut HeaderMap,
    ) -> Result<(), ProxyError> {
        match self {
            Authenticator::Passthrough => {
                let value = inbound
                    .get(header::AUTHORIZATION)
                    .filter(|v| !v.is_empty())
                    .ok_or(ProxyError::MissingAuthorization)?;
                outbound.insert(header::AUTHORIZATION, value.clone());
            }
            Authenticator::Server(creds) => match creds.placement {
                CredentialPlacement::Basic => {
                    outbound.insert(header::AUTHORIZATION, creds.basic.clone());
                }
                CredentialPlacement::Query => {
                    url.query_pairs_mut()
                        .append_pair("consumer_key", &creds.consumer_key)
                        .append_pair("consumer_secret", creds.consumer_secret.expose());
                }
            },
        }
        Ok(())
    }
}

impl ServerCredentials {
    fn new(consumer_key: &str, consumer_secret: Secret, placement: CredentialPlacement) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", consumer_key, consumer_secret.expose()));
        // base64 output is always a valid header value
        let mut basic = HeaderValue::from_str(&format!("Basic {}", encoded))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
        basic.set_sensitive(true);

        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret,
            placement,
            basic,
        }
    }
}
