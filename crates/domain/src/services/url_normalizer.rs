//! Target link normalization for rendered slides.
//!
//! Links entered by administrators come in three shapes: absolute (with a
//! host), bare domain names such as `example.com`, and paths relative to the
//! shop. Rendering needs all of them to resolve correctly from any page.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    /// Dotted host name whose last label does not start with a digit.
    static ref BARE_DOMAIN_RE: Regex = Regex::new(
        r"^(?:(?:[a-zA-Z0-9][a-zA-Z0-9\-]{0,61})?[a-zA-Z0-9]\.)+[a-zA-Z][a-zA-Z0-9]{0,62}"
    )
    .expect("valid regex");
}

fn has_host(link: &str) -> bool {
    if let Some(rest) = link.strip_prefix("//") {
        return rest
            .split(['/', '?', '#'])
            .next()
            .map(|host| !host.is_empty())
            .unwrap_or(false);
    }
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|h| !h.is_empty()))
        .unwrap_or(false)
}

/// Whether `link` looks like a domain name without a scheme.
pub fn is_bare_domain(link: &str) -> bool {
    if link.starts_with('-') || link.to_ascii_lowercase().starts_with("index.php") {
        return false;
    }
    BARE_DOMAIN_RE.is_match(link)
}

/// Normalizes a slide target link against the shop's base URL.
///
/// - empty and fragment-only links are returned unchanged
/// - links with a host (absolute or protocol-relative) are returned unchanged
/// - bare domains are made protocol-relative
/// - anything else is treated as a shop path and prefixed with `base_url`
pub fn normalize_target_url(link: &str, base_url: &str) -> String {
    if link.is_empty() || link.starts_with('#') || has_host(link) {
        return link.to_string();
    }
    if is_bare_domain(link) {
        return format!("//{}", link);
    }
    format!("{}{}", base_url, link.trim_start_matches('/'))
}
