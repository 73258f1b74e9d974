//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounted at the configured prefix
//! - Wire up middleware (request ID, tracing, CORS headers)
//! - Answer CORS preflight requests locally
//! - Hand everything else to the forwarder
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::{cors, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::proxy::forwarder::ensure_forwardable;
use crate::proxy::{Forwarder, InboundRequest, ProxyError};

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("cors.allow_origin is not a valid header value")]
    InvalidOrigin,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub max_body_size: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let forwarder = Forwarder::new(&config)?;
        Self::with_forwarder(config, forwarder)
    }

    /// Create a server around an already built forwarder.
    pub fn with_forwarder(config: ProxyConfig, forwarder: Forwarder) -> Result<Self, ServerError> {
        let allow_origin =
            HeaderValue::from_str(&config.cors.allow_origin).map_err(|_| ServerError::InvalidOrigin)?;

        let state = AppState {
            forwarder: Arc::new(forwarder),
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state, allow_origin);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState, allow_origin: HeaderValue) -> Router {
        let prefix = config.mount.prefix.as_str();

        let router = Router::new()
            .route(prefix, any(proxy_handler))
            .route(&format!("{}/", prefix), any(proxy_handler))
            .route(&format!("{}/{{*path}}", prefix), any(proxy_handler))
            .fallback(not_found)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        cors::apply(router, allow_origin)
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.mount.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
///
/// Answers preflight requests locally; everything else goes to the forwarder.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = if method == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        match forward(&state, request).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ProxyError::Transport(_)
                    | ProxyError::Configuration(_)
                    | ProxyError::Internal(_) => {
                        tracing::error!(request_id = %request_id, error = %err, "Proxy error")
                    }
                    _ => tracing::info!(request_id = %request_id, error = %err, "Request rejected"),
                }
                err.into_response()
            }
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    ensure_forwardable(request.method())?;
    let inbound = InboundRequest::from_request(request, state.max_body_size).await?;
    state.forwarder.forward(inbound).await
}

async fn not_found(request: Request<Body>) -> Response {
    ProxyError::NotFound(request.uri().path().to_string()).into_response()
}
