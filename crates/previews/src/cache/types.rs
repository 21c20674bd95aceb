use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata stored beside each cached payload.
///
/// Unrecognized fields are preserved verbatim across a load/save cycle
/// so newer writers can extend the format without older readers
/// destroying their data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Revalidation token from the origin, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// URL the payload was fetched from
    pub resource_url: String,

    /// URL the fetch resolved to after redirects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    /// Content type declared by the origin
    pub content_type: String,

    /// Epoch seconds at which the entry was written. Left empty by
    /// callers; the store fills it in at save time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<i64>,

    /// Fields this version does not recognize
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntryMetadata {
    /// Create metadata for a freshly fetched payload.
    pub fn new(resource_url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            etag: None,
            resource_url: resource_url.into(),
            final_url: None,
            content_type: content_type.into(),
            stored_at: None,
            extra: Map::new(),
        }
    }

    /// Set the ETag value as an Option
    pub fn with_etag_option(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }

    /// Set the post-redirect URL
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = Some(final_url.into());
        self
    }
}
