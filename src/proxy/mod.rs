//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, path, raw query, headers, body)
//!     → forwarder.rs (method check, buffered body)
//!     → path.rs (strip mount prefix once, reject dot segments)
//!     → auth.rs (passthrough or server-held credentials)
//!     → reqwest (single upstream call, no retry)
//!     → http/response.rs (drop transport headers)
//!     → OutboundResponse (status and body unchanged)
//! ```
//!
//! # Design Decisions
//! - One authentication policy per deployment, resolved at startup
//! - Upstream error payloads are relayed verbatim, never reshaped
//! - Transport failures map to 503, configuration gaps to 500

pub mod auth;
pub mod error;
pub mod forwarder;
pub mod path;

pub use auth::Authenticator;
pub use error::{ConfigurationError, ProxyError};
pub use forwarder::{Forwarder, InboundRequest};
