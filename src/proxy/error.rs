//! Error taxonomy for forwarded requests.
//!
//! Every variant is request-local: it becomes a JSON response and the server
//! keeps running. Upstream non-2xx responses are not errors; they are relayed.

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::http::cors::ALLOW_METHODS;

/// Required settings that are absent from the loaded configuration.
///
/// Holds setting names only, never values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing settings: {}", .missing.join(", "))]
pub struct ConfigurationError {
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Authorization header missing")]
    MissingAuthorization,

    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),

    #[error("path {0} is not under the mount prefix")]
    NotFound(String),

    #[error("path {0} contains dot segments")]
    InvalidPath(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("server configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No response was received from the upstream store.
    #[error("upstream unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Wrap a transport failure, dropping the URL so credential query
    /// parameters can never reach a log line.
    pub fn transport(err: reqwest::Error) -> Self {
        ProxyError::Transport(err.without_url())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Configuration(_) | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to return to the caller.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MissingAuthorization => "Authorization header missing.",
            ProxyError::MethodNotAllowed(_) => "Method Not Allowed",
            ProxyError::NotFound(_) => "Not Found",
            ProxyError::InvalidPath(_) => "Bad Request: invalid path",
            ProxyError::PayloadTooLarge { .. } => "Payload Too Large",
            ProxyError::Configuration(_) => {
                "Server configuration error: WooCommerce keys or URL not set."
            }
            ProxyError::Transport(_) => "Service Unavailable: No response from WooCommerce API",
            ProxyError::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::Configuration(err) => json!({
                "error": self.public_message(),
                "missing": err.missing,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        let mut response = (status, Json(body)).into_response();
        if let ProxyError::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
        }
        response
    }
}
