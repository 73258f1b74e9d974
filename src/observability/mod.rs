//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs / proxy::forwarder
//!     → logging.rs (structured log events, request_id field)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Consumer secrets never appear in log fields
//! - Request ID flows from the inbound request to the upstream call

pub mod logging;
pub mod metrics;
