//! Preview URL extraction and default-image heuristics.
//!
//! Repository pages advertise their social card through `og:image`,
//! with `twitter:image` as a fallback convention. Extraction works on
//! the raw HTML; attribute order inside the `<meta>` tag is not
//! guaranteed, so each convention gets a pattern per order.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static OG_IMAGE: LazyLock<[Regex; 2]> = LazyLock::new(|| meta_patterns("property", "og:image"));
static TWITTER_IMAGE: LazyLock<[Regex; 2]> =
    LazyLock::new(|| meta_patterns("name", "twitter:image"));

fn meta_patterns(attr: &str, value: &str) -> [Regex; 2] {
    let value = regex::escape(value);
    [
        Regex::new(&format!(
            r#"(?i)<meta\b[^>]*\b{attr}\s*=\s*["']{value}["'][^>]*\bcontent\s*=\s*["']([^"']+)["']"#
        ))
        .unwrap(),
        Regex::new(&format!(
            r#"(?i)<meta\b[^>]*\bcontent\s*=\s*["']([^"']+)["'][^>]*\b{attr}\s*=\s*["']{value}["']"#
        ))
        .unwrap(),
    ]
}

/// Find the candidate preview URL advertised by a fetched page, if any.
pub fn extract_preview_url(html: &str) -> Option<String> {
    for pattern in OG_IMAGE.iter().chain(TWITTER_IMAGE.iter()) {
        if let Some(caps) = pattern.captures(html) {
            let content = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if !content.is_empty() {
                return Some(content.to_owned());
            }
        }
    }

    None
}

/// Whether a fetched image looks like GitHub's own branding card rather
/// than repository-specific content.
///
/// Generated opengraph.githubassets.com cards still pass; only the
/// static logo/branding assets are rejected.
pub fn looks_like_default_preview(final_url: &str, content_type: Option<&str>) -> bool {
    if let Some(content_type) = content_type {
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return true;
        }
    }

    let Ok(parsed) = Url::parse(final_url) else {
        return false;
    };

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = parsed.path().to_ascii_lowercase();

    host.ends_with("githubassets.com")
        && (path.contains("github-logo")
            || path.contains("github-mark")
            || path.contains("/images/modules/open_graph/")
            || path.contains("/images/modules/site/"))
}
