//! The request forwarder.
//!
//! Built once from the validated configuration and shared read-only between
//! requests. Each call makes at most one upstream request and never retries.

use std::time::Instant;

use axum::{
    body::{self, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request},
    response::Response,
};
use url::Url;

use crate::config::ProxyConfig;
use crate::http::response::relay_headers;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::proxy::auth::Authenticator;
use crate::proxy::error::{ConfigurationError, ProxyError};
use crate::proxy::path::{derive_upstream_path, has_dot_segment, is_within, upstream_endpoint};

/// Methods the forwarder sends upstream. OPTIONS is answered locally.
pub const FORWARDED_METHODS: [Method; 5] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
];

/// The parts of an inbound request the forwarder uses.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    /// Buffer an axum request, enforcing `max_body_size`.
    pub async fn from_request(
        request: Request<Body>,
        max_body_size: usize,
    ) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = body::to_bytes(body, max_body_size)
            .await
            .map_err(|_| ProxyError::PayloadTooLarge {
                limit: max_body_size,
            })?;

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        })
    }
}

/// Fails with 405 for anything outside the forwarded set.
pub fn ensure_forwardable(method: &Method) -> Result<(), ProxyError> {
    if FORWARDED_METHODS.contains(method) {
        Ok(())
    } else {
        Err(ProxyError::MethodNotAllowed(method.clone()))
    }
}

/// Whether the upstream request carries the inbound body.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

/// Upstream endpoint and credentials, available only when fully configured.
#[derive(Debug, Clone)]
struct Target {
    base_url: String,
    api_path: String,
    /// Path of the API root on the upstream host; no request may leave it.
    root_path: String,
    authenticator: Authenticator,
}

impl Target {
    fn resolve(config: &ProxyConfig) -> Result<Self, ConfigurationError> {
        let base_url = config
            .upstream
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty());
        let authenticator = Authenticator::from_config(&config.auth);

        match (base_url, authenticator) {
            (Some(base_url), Ok(authenticator)) => {
                let api_path = config.upstream.api_path.clone();
                let root_path = Url::parse(&upstream_endpoint(base_url, &api_path, ""))
                    .map(|url| url.path().to_string())
                    .unwrap_or_else(|_| format!("/{}", api_path.trim_matches('/')));
                Ok(Self {
                    base_url: base_url.to_string(),
                    api_path,
                    root_path,
                    authenticator,
                })
            }
            (base_url, authenticator) => {
                let mut missing = Vec::new();
                if base_url.is_none() {
                    missing.push("upstream.base_url");
                }
                if let Err(err) = authenticator {
                    missing.extend(err.missing);
                }
                Err(ConfigurationError { missing })
            }
        }
    }
}

/// Forwards inbound requests to the WooCommerce REST API.
pub struct Forwarder {
    client: reqwest::Client,
    mount_prefix: String,
    target: Result<Target, ConfigurationError>,
}

impl Forwarder {
    /// Build a forwarder from a validated configuration.
    ///
    /// Missing upstream settings do not fail construction; they are reported
    /// on every forwarded request instead.
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &ProxyConfig, client: reqwest::Client) -> Self {
        let target = Target::resolve(config);
        match &target {
            Ok(target) => tracing::info!(
                base_url = %target.base_url,
                api_path = %target.api_path,
                policy = target.authenticator.policy().as_str(),
                "Forwarder configured"
            ),
            Err(err) => tracing::warn!(
                error = %err,
                "Forwarder is not fully configured; requests will fail with 500"
            ),
        }

        Self {
            client,
            mount_prefix: config.mount.prefix.clone(),
            target,
        }
    }

    /// Forward one request and relay the upstream response.
    ///
    /// Upstream non-2xx responses are returned as `Ok`, unchanged.
    pub async fn forward(&self, inbound: InboundRequest) -> Result<Response, ProxyError> {
        ensure_forwardable(&inbound.method)?;

        let derived = derive_upstream_path(&self.mount_prefix, &inbound.path)
            .ok_or_else(|| ProxyError::NotFound(inbound.path.clone()))?;
        if has_dot_segment(derived) {
            return Err(ProxyError::InvalidPath(inbound.path.clone()));
        }

        let target = self.target.as_ref().map_err(|err| err.clone())?;

        let mut url = Url::parse(&upstream_endpoint(&target.base_url, &target.api_path, derived))
            .map_err(|e| ProxyError::Internal(format!("invalid upstream URL: {}", e)))?;
        if !is_within(url.path(), &target.root_path) {
            return Err(ProxyError::InvalidPath(inbound.path.clone()));
        }
        url.set_query(inbound.query.as_deref());

        let mut headers = HeaderMap::new();
        target
            .authenticator
            .apply(&inbound.headers, &mut url, &mut headers)?;

        let content_type = inbound
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_TYPE, content_type);
        if let Some(request_id) = inbound.headers.get(X_REQUEST_ID) {
            headers.insert(X_REQUEST_ID, request_id.clone());
        }

        let request_id = inbound
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        tracing::debug!(
            request_id = %request_id,
            method = %inbound.method,
            upstream_path = %derived,
            "Forwarding request"
        );

        let mut builder = self
            .client
            .request(inbound.method.clone(), url)
            .headers(headers);
        if carries_body(&inbound.method) {
            builder = builder.body(inbound.body);
        }

        let started = Instant::now();
        let upstream = match builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_builder() => {
                return Err(ProxyError::Internal(err.without_url().to_string()));
            }
            Err(err) => {
                metrics::record_upstream_error("send");
                return Err(ProxyError::transport(err));
            }
        };

        let status = upstream.status();
        let relayed = relay_headers(upstream.headers());
        let bytes = upstream.bytes().await.map_err(|err| {
            metrics::record_upstream_error("body");
            ProxyError::transport(err)
        })?;

        if status.is_success() {
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "Upstream responded"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "Upstream returned an error response"
            );
        }

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = relayed;
        Ok(response)
    }
}
