//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (environment overlay: WOOCOMMERCE_*, WOO_PROXY_*)
//!     → CLI flag overrides (main.rs)
//!     → validation.rs (semantic checks, mount prefix normalization)
//!     → ProxyConfig (validated, immutable)
//!     → handed to the forwarder once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; it is never re-read per request
//! - All fields have defaults to allow minimal configs
//! - The consumer secret is wrapped so it cannot leak through `Debug`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    AuthConfig, AuthPolicy, CorsConfig, CredentialPlacement, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyConfig, Secret, UpstreamConfig,
};
