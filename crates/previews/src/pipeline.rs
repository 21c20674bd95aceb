//! Per-repository fetch pipeline.
//!
//! Resolves the repository page, extracts the advertised preview URL,
//! revalidates against the cache with `If-None-Match`, validates the
//! fresh payload, and commits the result back to the cache. Only the
//! two network round-trips can fail with an error; every other early
//! exit is a skip.

use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use crate::cache::{CacheStore, EntryMetadata, derive_key};
use crate::config::PreviewConfig;
use crate::error::PreviewError;
use crate::extract::{extract_preview_url, looks_like_default_preview};
use crate::session::SessionPool;

/// Payloads below this floor are placeholder-sized, not real previews.
const MIN_PREVIEW_BYTES: usize = 2_000;

/// Terminal state of one repository's fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A usable preview payload
    Fetched(Bytes),
    /// The repository has no usable preview; not an error
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page advertises no preview URL
    NoPreviewUrl,
    /// The resource is not served as an image
    NotAnImage,
    /// The payload is below the placeholder floor
    BelowSizeFloor,
    /// The default-image heuristic matched
    DefaultPreview,
}

/// Fetch one repository's preview through the cache.
///
/// The HTTP client comes from the session pool under the calling
/// worker's id, so concurrent pipelines never share a client.
pub async fn fetch_one(
    sessions: &SessionPool,
    worker_id: usize,
    name: &str,
    cache: Option<&dyn CacheStore>,
    config: &PreviewConfig,
) -> Result<FetchOutcome, PreviewError> {
    let client = sessions.client_for(worker_id)?;
    let page_url = format!("{}/{}/{}", config.web_base, config.owner, name);

    let page = client.get(&page_url).send().await?;
    if !page.status().is_success() {
        return Err(PreviewError::StatusCode(page.status()));
    }
    let html = page.text().await?;

    let Some(resource_url) = extract_preview_url(&html) else {
        return Ok(FetchOutcome::Skipped(SkipReason::NoPreviewUrl));
    };

    let key = derive_key(&format!("{}/{}", config.owner, name));
    let cached = match cache {
        Some(store) => store.load(&key).await,
        None => None,
    };
    let cached_etag = cached.as_ref().and_then(|(_, meta)| meta.etag.clone());

    let mut response = conditional_get(&client, &resource_url, cached_etag.as_deref()).await?;

    match classify_revalidation(response.status(), cached.is_some()) {
        Revalidation::ReuseCached => {
            if let Some((payload, _)) = cached {
                debug!(repo = name, "Preview unchanged upstream, reusing cached payload");
                return Ok(FetchOutcome::Fetched(payload));
            }
        }
        Revalidation::RefetchUnconditionally => {
            response = conditional_get(&client, &resource_url, None).await?;
        }
        Revalidation::UseFresh => {}
    }

    if !response.status().is_success() {
        return Err(PreviewError::StatusCode(response.status()));
    }

    let (etag, content_type) = cache_headers(&response);
    let final_url = response.url().to_string();
    let payload = response.bytes().await?;

    if let Some(reason) = validate_payload(content_type.as_deref(), payload.len()) {
        return Ok(FetchOutcome::Skipped(reason));
    }

    if config.skip_default_previews
        && looks_like_default_preview(&final_url, content_type.as_deref())
    {
        return Ok(FetchOutcome::Skipped(SkipReason::DefaultPreview));
    }

    if let Some(store) = cache {
        let metadata = EntryMetadata::new(resource_url, content_type.unwrap_or_default())
            .with_etag_option(etag)
            .with_final_url(final_url);

        // The fetch already succeeded; a cache write problem must not
        // cost the run this payload.
        if let Err(e) = store.save(&key, payload.clone(), metadata).await {
            warn!(repo = name, error = %e, "Failed to cache preview");
        }
    }

    Ok(FetchOutcome::Fetched(payload))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Revalidation {
    /// 304 and a cached payload exists: reuse it, write nothing
    ReuseCached,
    /// 304 but nothing cached locally: retry without the validator
    RefetchUnconditionally,
    /// Anything else: the response body is authoritative
    UseFresh,
}

fn classify_revalidation(status: StatusCode, have_cached_payload: bool) -> Revalidation {
    if status != StatusCode::NOT_MODIFIED {
        Revalidation::UseFresh
    } else if have_cached_payload {
        Revalidation::ReuseCached
    } else {
        Revalidation::RefetchUnconditionally
    }
}

async fn conditional_get(
    client: &Client,
    url: &str,
    etag: Option<&str>,
) -> Result<reqwest::Response, PreviewError> {
    let mut request = client.get(url);
    if let Some(etag) = etag {
        request = request.header(header::IF_NONE_MATCH, etag);
    }
    Ok(request.send().await?)
}

/// Pull the revalidation and type headers off a response.
fn cache_headers(response: &reqwest::Response) -> (Option<String>, Option<String>) {
    let etag = response
        .headers()
        .get(header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    (etag, content_type)
}

fn validate_payload(content_type: Option<&str>, len: usize) -> Option<SkipReason> {
    match content_type {
        Some(content_type) if content_type.to_ascii_lowercase().starts_with("image/") => {}
        _ => return Some(SkipReason::NotAnImage),
    }

    if len < MIN_PREVIEW_BYTES {
        return Some(SkipReason::BelowSizeFloor);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_modified_with_cached_payload_reuses_it() {
        assert_eq!(
            classify_revalidation(StatusCode::NOT_MODIFIED, true),
            Revalidation::ReuseCached
        );
    }

    #[test]
    fn not_modified_without_cached_payload_refetches() {
        assert_eq!(
            classify_revalidation(StatusCode::NOT_MODIFIED, false),
            Revalidation::RefetchUnconditionally
        );
    }

    #[test]
    fn ordinary_responses_are_authoritative() {
        assert_eq!(
            classify_revalidation(StatusCode::OK, true),
            Revalidation::UseFresh
        );
        assert_eq!(
            classify_revalidation(StatusCode::INTERNAL_SERVER_ERROR, false),
            Revalidation::UseFresh
        );
    }

    #[test]
    fn undersized_payload_is_skipped() {
        assert_eq!(
            validate_payload(Some("image/png"), 50),
            Some(SkipReason::BelowSizeFloor)
        );
    }

    #[test]
    fn non_image_content_type_is_skipped() {
        assert_eq!(
            validate_payload(Some("text/html; charset=utf-8"), 50_000),
            Some(SkipReason::NotAnImage)
        );
        assert_eq!(validate_payload(None, 50_000), Some(SkipReason::NotAnImage));
    }

    #[test]
    fn real_image_passes_validation() {
        assert_eq!(validate_payload(Some("image/png"), MIN_PREVIEW_BYTES), None);
        assert_eq!(validate_payload(Some("IMAGE/JPEG"), 100_000), None);
    }
}
