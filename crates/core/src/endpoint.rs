//! Endpoint derivation for WordPress REST collections.
//!
//! Only the posts endpoint has to be configured; every sibling collection
//! (pages, media, taxonomies, custom post types, menus) is derived from it by
//! plain text substitution. Three URL shapes are recognised, tried in order:
//!
//! 1. pretty permalinks, `https://example.com/wp-json/wp/v2/posts?x=y`
//! 2. plain permalinks, `https://example.com/?rest_route=/wp/v2/posts&x=y`
//! 3. any URL ending in `posts`, `pages` or `media`
//!
//! Anything else is returned unchanged. Targets are never sanitised, so a
//! slug containing `/` or `?` produces whatever text substitution yields.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static PRETTY_RESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?/wp-json/wp/v2/)([^/?]+)(.*)$").expect("valid pretty permalink pattern")
});

static REST_ROUTE_RESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(rest_route=/wp/v2/)([^&]+)").expect("valid rest_route pattern")
});

static PRETTY_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?/wp-json/wp/v2)/[^/?]+").expect("valid pretty root pattern")
});

static REST_ROUTE_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\?rest_route=/wp/v2/").expect("valid rest_route root pattern")
});

/// Trailing resource names recognised by the suffix fallback, in match order.
const KNOWN_SUFFIXES: [&str; 3] = ["posts", "pages", "media"];

/// Derive the sibling collection endpoint for `target` from `base`.
///
/// Returns an empty string for an empty base so callers can report the
/// missing configuration.
pub fn derive_endpoint(base: &str, target: &str) -> String {
    if base.is_empty() {
        return String::new();
    }

    if let Some(caps) = PRETTY_RESOURCE.captures(base) {
        return format!("{}{}{}", &caps[1], target, &caps[3]);
    }

    if REST_ROUTE_RESOURCE.is_match(base) {
        return REST_ROUTE_RESOURCE
            .replace_all(base, |caps: &Captures| format!("{}{}", &caps[1], target))
            .into_owned();
    }

    for suffix in KNOWN_SUFFIXES {
        if let Some(prefix) = base.strip_suffix(suffix) {
            return format!("{}{}", prefix, target);
        }
    }

    base.to_string()
}

/// Strip the resource segment of a collection endpoint, yielding the
/// `/wp/v2` root (or `?rest_route=/wp/v2`).
pub fn base_api_root(posts_endpoint: &str) -> String {
    if posts_endpoint.is_empty() {
        return String::new();
    }

    if let Some(caps) = PRETTY_ROOT.captures(posts_endpoint) {
        return caps[1].to_string();
    }

    if let Some(caps) = REST_ROUTE_ROOT.captures(posts_endpoint) {
        return format!("{}?rest_route=/wp/v2", &caps[1]);
    }

    for suffix in KNOWN_SUFFIXES {
        if let Some(prefix) = posts_endpoint.strip_suffix(suffix) {
            // drop the separator in front of the resource as well
            let mut chars = prefix.chars();
            chars.next_back();
            return chars.as_str().to_string();
        }
    }

    posts_endpoint.to_string()
}

/// URL of a single item inside a collection.
pub fn item_url(endpoint: &str, id: impl std::fmt::Display) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), id)
}

/// Append urlencoded query parameters, joining with `?` or `&`.
pub fn with_query<K, V>(url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return url.to_string();
    }

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        query.append_pair(key.as_ref(), value.as_ref());
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_permalinks() {
        let base = "https://example.com/wp-json/wp/v2/posts";
        assert_eq!(
            derive_endpoint(base, "pages"),
            "https://example.com/wp-json/wp/v2/pages"
        );
        assert_eq!(
            derive_endpoint(base, "tags"),
            "https://example.com/wp-json/wp/v2/tags"
        );
    }

    #[test]
    fn test_pretty_permalinks_keep_query_string() {
        let base = "https://example.com/blog/wp-json/wp/v2/posts?context=edit&lang=fr";
        assert_eq!(
            derive_endpoint(base, "categories"),
            "https://example.com/blog/wp-json/wp/v2/categories?context=edit&lang=fr"
        );
    }

    #[test]
    fn test_pretty_permalinks_keep_trailing_path() {
        assert_eq!(
            derive_endpoint("https://example.com/wp-json/wp/v2/posts/", "product"),
            "https://example.com/wp-json/wp/v2/product/"
        );
    }

    #[test]
    fn test_rest_route_style() {
        assert_eq!(
            derive_endpoint("https://x.test/?rest_route=/wp/v2/posts", "pages"),
            "https://x.test/?rest_route=/wp/v2/pages"
        );
        assert_eq!(
            derive_endpoint("https://x.test/index.php?rest_route=/wp/v2/posts&per_page=5", "tags"),
            "https://x.test/index.php?rest_route=/wp/v2/tags&per_page=5"
        );
    }

    #[test]
    fn test_suffix_fallback() {
        assert_eq!(derive_endpoint("https://x.test/api/posts", "pages"), "https://x.test/api/pages");
        assert_eq!(derive_endpoint("https://x.test/api/media", "tags"), "https://x.test/api/tags");
    }

    #[test]
    fn test_unmatched_is_unchanged() {
        let base = "https://x.test/api/articles";
        assert_eq!(derive_endpoint(base, "pages"), base);
        assert_eq!(derive_endpoint("not a url", "pages"), "not a url");
    }

    #[test]
    fn test_empty_base() {
        assert_eq!(derive_endpoint("", "pages"), "");
        assert_eq!(base_api_root(""), "");
    }

    #[test]
    fn test_target_is_not_sanitized() {
        assert_eq!(
            derive_endpoint("https://x.test/wp-json/wp/v2/posts", "shop/items"),
            "https://x.test/wp-json/wp/v2/shop/items"
        );
        assert_eq!(
            derive_endpoint("https://x.test/?rest_route=/wp/v2/posts", "a$1b"),
            "https://x.test/?rest_route=/wp/v2/a$1b"
        );
    }

    #[test]
    fn test_base_api_root() {
        assert_eq!(
            base_api_root("https://x.test/wp-json/wp/v2/posts"),
            "https://x.test/wp-json/wp/v2"
        );
        assert_eq!(
            base_api_root("https://x.test/?rest_route=/wp/v2/posts"),
            "https://x.test/?rest_route=/wp/v2"
        );
        assert_eq!(base_api_root("https://x.test/api/posts"), "https://x.test/api");
        assert_eq!(base_api_root("https://x.test/api/articles"), "https://x.test/api/articles");
    }

    #[test]
    fn test_item_url() {
        assert_eq!(item_url("https://x.test/wp-json/wp/v2/posts/", 12), "https://x.test/wp-json/wp/v2/posts/12");
        assert_eq!(item_url("https://x.test/wp-json/wp/v2/posts", 12), "https://x.test/wp-json/wp/v2/posts/12");
    }

    #[test]
    fn test_with_query() {
        let url = with_query("https://x.test/wp-json/wp/v2/posts", &[("per_page", "20"), ("search", "hello world")]);
        assert_eq!(url, "https://x.test/wp-json/wp/v2/posts?per_page=20&search=hello+world");

        let url = with_query("https://x.test/?rest_route=/wp/v2/posts", &[("page", "2")]);
        assert_eq!(url, "https://x.test/?rest_route=/wp/v2/posts&page=2");

        let empty: [(&str, &str); 0] = [];
        assert_eq!(with_query("https://x.test/", &empty), "https://x.test/");
    }
}
