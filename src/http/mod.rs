//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, CORS headers)
//!     → OPTIONS answered locally with 204
//!     → proxy::Forwarder (derive path, inject auth, call upstream)
//!     → response.rs (drop framing and hop-by-hop headers)
//!     → Send to client
//! ```

pub mod cors;
pub mod response;
pub mod server;

pub use server::{HttpServer, ServerError};

/// Request correlation header, generated when the client sends none.
pub const X_REQUEST_ID: &str = "x-request-id";
