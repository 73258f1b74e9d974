//! Response handling and transformation.
//!
//! # Responsibilities
//! - Copy upstream response headers for the client
//! - Drop headers that conflict with re-framing the buffered body
//! - Strip hop-by-hop headers

use axum::http::{header, HeaderMap, HeaderName};

/// Headers never relayed from the upstream response.
const DROPPED: [HeaderName; 10] = [
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONTENT_ENCODING,
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    HeaderName::from_static("keep-alive"),
];

/// Copy `upstream` headers, minus framing and hop-by-hop headers.
///
/// The body is re-framed by the server, so the upstream length and encoding
/// no longer describe it.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !DROPPED.contains(name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}
