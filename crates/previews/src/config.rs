use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

const DEFAULT_USER_AGENT: &str = "repo-previews/0.1 (+https://github.com/hua0512/repo-previews)";

/// Default time-to-live for cached previews: one week.
pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Configurable options for a preview collection run.
///
/// Built once at process start and passed by parameter; the engine keeps
/// no process-wide state.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Account whose repositories are listed
    pub owner: String,

    /// Optional API token, attached as a bearer credential to listing requests
    pub token: Option<String>,

    /// Number of concurrent fetch workers
    pub max_workers: usize,

    /// Whether the disk cache is consulted and written
    pub use_cache: bool,

    /// Directory holding cached payloads and their metadata
    pub cache_dir: PathBuf,

    /// Entries older than this are removed before fetching; zero or
    /// negative disables expiry
    pub cache_ttl_seconds: i64,

    /// Overall timeout for each HTTP request
    pub request_timeout: Duration,

    /// Whether to discard previews that look like generic branding images
    pub skip_default_previews: bool,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Base URL of the listing API
    pub api_base: String,

    /// Base URL of the repository pages
    pub web_base: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            token: None,
            max_workers: 8,
            use_cache: true,
            cache_dir: PathBuf::from(".repo-preview-cache"),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            request_timeout: Duration::from_secs(15),
            skip_default_previews: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: PreviewConfig::get_default_headers(),
            api_base: "https://api.github.com".to_owned(),
            web_base: "https://github.com".to_owned(),
        }
    }
}

impl PreviewConfig {
    pub fn builder() -> crate::builder::PreviewConfigBuilder {
        crate::builder::PreviewConfigBuilder::new()
    }

    /// Create a config for the given account with everything else at defaults.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );

        default_headers
    }
}
