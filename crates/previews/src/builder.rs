//! # Builder for PreviewConfig
//!
//! Fluent API for creating and customizing [`PreviewConfig`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use previews_engine::PreviewConfig;
//!
//! let config = PreviewConfig::builder()
//!     .with_owner("hua0512")
//!     .with_max_workers(4)
//!     .with_request_timeout(Duration::from_secs(30))
//!     .with_caching_enabled(false)
//!     .build();
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::PreviewConfig;

/// Builder for creating PreviewConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct PreviewConfigBuilder {
    config: PreviewConfig,
}

impl PreviewConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: PreviewConfig::default(),
        }
    }

    /// Set the account whose repositories are listed
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.config.owner = owner.into();
        self
    }

    /// Set the API token used for listing requests
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.config.token = token;
        self
    }

    /// Set the worker pool size (clamped to at least one worker)
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers.max(1);
        self
    }

    /// Enable or disable the disk cache
    pub fn with_caching_enabled(mut self, enabled: bool) -> Self {
        self.config.use_cache = enabled;
        self
    }

    /// Set the cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    /// Set the cache time-to-live; zero or negative disables expiry
    pub fn with_cache_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.config.cache_ttl_seconds = ttl_seconds;
        self
    }

    /// Set the overall timeout for each HTTP request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set whether generic branding previews are discarded
    pub fn with_skip_default_previews(mut self, skip: bool) -> Self {
        self.config.skip_default_previews = skip;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<reqwest::header::HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Set the base URL of the listing API
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    /// Set the base URL of the repository pages
    pub fn with_web_base(mut self, base: impl Into<String>) -> Self {
        self.config.web_base = base.into();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> PreviewConfig {
        self.config
    }
}

impl Default for PreviewConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
