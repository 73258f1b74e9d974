//! Upstream path derivation.
//!
//! The inbound path is `{mount_prefix}{derived}`; the upstream path is
//! `/{api_path}{derived}`. The query string never passes through here.

/// Strip `mount_prefix` from `path` exactly once.
///
/// `mount_prefix` must already be normalized (leading slash, no trailing
/// slash). The prefix only matches on a segment boundary, and the returned
/// remainder keeps its leading slash so that `mount_prefix + derived == path`.
/// An empty remainder addresses the API root.
pub fn derive_upstream_path<'a>(mount_prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(mount_prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Whether a derived path contains `.` or `..` segments, plain or percent-encoded.
///
/// URL parsing resolves those segments, which would let a caller climb out of
/// the API path on the upstream host. http(s) URLs treat `\` as a separator
/// too, so segments are split on both.
pub fn has_dot_segment(derived: &str) -> bool {
    derived.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// Whether a resolved upstream path is `root` itself or lies below it.
pub fn is_within(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Join the store base URL, API path and derived path into the upstream URL.
pub fn upstream_endpoint(base_url: &str, api_path: &str, derived: &str) -> String {
    format!(
        "{}/{}{}",
        base_url.trim_end_matches('/'),
        api_path.trim_matches('/'),
        derived
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/api/proxy";

    #[test]
    fn test_strips_prefix_and_keeps_segments() {
        assert_eq!(derive_upstream_path(PREFIX, "/api/proxy/products"), Some("/products"));
        assert_eq!(
            derive_upstream_path(PREFIX, "/api/proxy/products/42/variations"),
            Some("/products/42/variations")
        );
    }

    #[test]
    fn test_empty_sub_path_is_api_root() {
        assert_eq!(derive_upstream_path(PREFIX, "/api/proxy"), Some(""));
        assert_eq!(derive_upstream_path(PREFIX, "/api/proxy/"), Some("/"));
    }

    #[test]
    fn test_trailing_slash_is_preserved() {
        assert_eq!(derive_upstream_path(PREFIX, "/api/proxy/orders/"), Some("/orders/"));
    }

    #[test]
    fn test_prefix_is_removed_only_once() {
        assert_eq!(
            derive_upstream_path(PREFIX, "/api/proxy/api/proxy/products"),
            Some("/api/proxy/products")
        );
    }

    #[test]
    fn test_prefix_must_end_on_segment_boundary() {
        assert_eq!(derive_upstream_path(PREFIX, "/api/proxyfoo"), None);
        assert_eq!(derive_upstream_path(PREFIX, "/other/products"), None);
        assert_eq!(derive_upstream_path(PREFIX, "/api"), None);
    }

    #[test]
    fn test_query_like_characters_pass_through_verbatim() {
        assert_eq!(
            derive_upstream_path(PREFIX, "/api/proxy/products/a%3Fb%26c=d"),
            Some("/products/a%3Fb%26c=d")
        );
    }

    #[test]
    fn test_reconstruction_round_trips() {
        let paths = [
            "/api/proxy",
            "/api/proxy/",
            "/api/proxy/products",
            "/api/proxy/products/",
            "/api/proxy/orders/7/notes",
            "/api/proxy/a%20b",
        ];
        for path in paths {
            let derived = derive_upstream_path(PREFIX, path).unwrap();
            assert_eq!(format!("{}{}", PREFIX, derived), path);
        }
    }

    #[test]
    fn test_dot_segments_are_detected() {
        assert!(has_dot_segment("/../wp-admin"));
        assert!(has_dot_segment("/products/./1"));
        assert!(has_dot_segment("/%2E%2e/wp-admin"));
        assert!(has_dot_segment("/.%2e"));
        assert!(!has_dot_segment("/products/v1.2"));
        assert!(!has_dot_segment("/...hidden"));
        assert!(!has_dot_segment(""));
    }

    #[test]
    fn test_backslash_separated_dot_segments_are_detected() {
        assert!(has_dot_segment("/..\\..\\wp-admin/x"));
        assert!(has_dot_segment("/products\\%2e%2e"));
        assert!(has_dot_segment("\\."));
        assert!(!has_dot_segment("/products\\v1.2"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/wp-json/wc/v3", "/wp-json/wc/v3"));
        assert!(is_within("/wp-json/wc/v3/", "/wp-json/wc/v3"));
        assert!(is_within("/wp-json/wc/v3/products", "/wp-json/wc/v3/"));
        assert!(!is_within("/wp-json/wc/v3x", "/wp-json/wc/v3"));
        assert!(!is_within("/wp-admin/x", "/wp-json/wc/v3"));
        assert!(!is_within("/", "/wp-json/wc/v3"));
    }

    #[test]
    fn test_upstream_endpoint() {
        assert_eq!(
            upstream_endpoint("https://shop.example.com/", "/wp-json/wc/v3/", "/products"),
            "https://shop.example.com/wp-json/wc/v3/products"
        );
        assert_eq!(
            upstream_endpoint("https://shop.example.com", "wp-json/wc/v3", ""),
            "https://shop.example.com/wp-json/wc/v3"
        );
    }
}
