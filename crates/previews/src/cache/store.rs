use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::types::EntryMetadata;
use crate::error::PreviewError;

/// Read/write seam between the fetch pipeline and persistent storage.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a previously stored entry. A missing, unreadable, or
    /// corrupt entry is a miss, never an error.
    async fn load(&self, key: &str) -> Option<(Bytes, EntryMetadata)>;

    /// Persist an entry, replacing whatever was stored under the key.
    async fn save(&self, key: &str, payload: Bytes, metadata: EntryMetadata) -> io::Result<()>;
}

/// Disk cache:
///   - `<key>.bin`  (payload bytes)
///   - `<key>.meta` (JSON metadata: etag, resource_url, content_type, stored_at)
///
/// A single store-wide lock serializes the filesystem sequence of every
/// operation, so concurrent workers never observe a torn entry. Network
/// I/O is never performed under this lock.
#[derive(Debug)]
pub struct DiskCache {
    cache_dir: PathBuf,
    lock: Mutex<()>,
}

impl DiskCache {
    /// Open the cache at `cache_dir`, creating the directory tree as needed.
    pub async fn open(cache_dir: impl Into<PathBuf>) -> Result<Self, PreviewError> {
        let cache_dir = cache_dir.into();

        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|source| PreviewError::StorageUnavailable {
                path: cache_dir.clone(),
                source,
            })?;

        Ok(Self {
            cache_dir,
            lock: Mutex::new(()),
        })
    }

    fn data_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.bin"))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.meta"))
    }

    /// Delete every entry older than `ttl_seconds` and return the number
    /// removed. A zero or negative TTL disables expiry. Best-effort: a
    /// failure on one entry is logged at that entry's scope and the scan
    /// continues.
    pub async fn evict_expired(&self, ttl_seconds: i64) -> usize {
        if ttl_seconds <= 0 {
            return 0;
        }

        let now = epoch_seconds();
        let _guard = self.lock.lock().await;

        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = ?self.cache_dir, error = %e, "Failed to read cache directory");
                return 0;
            }
        };

        let mut removed = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = ?self.cache_dir, error = %e, "Failed to advance cache directory scan");
                    break;
                }
            };

            let meta_path = entry.path();
            if meta_path.extension().is_none_or(|ext| ext != "meta") {
                continue;
            }

            let Some(age) = entry_age(&meta_path, now).await else {
                continue;
            };

            if age <= ttl_seconds {
                continue;
            }

            let data_path = meta_path.with_extension("bin");

            // Remove both halves; a vanished half is fine.
            match fs::remove_file(&meta_path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    warn!(path = ?meta_path, error = %e, "Failed to remove expired metadata file");
                    continue;
                }
                _ => {}
            }
            match fs::remove_file(&data_path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    warn!(path = ?data_path, error = %e, "Failed to remove expired payload file");
                }
                _ => {}
            }

            removed += 1;
        }

        removed
    }
}

#[async_trait::async_trait]
impl CacheStore for DiskCache {
    async fn load(&self, key: &str) -> Option<(Bytes, EntryMetadata)> {
        let data_path = self.data_path(key);
        let meta_path = self.meta_path(key);

        let _guard = self.lock.lock().await;

        let meta_bytes = fs::read(&meta_path).await.ok()?;
        let metadata: EntryMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = ?meta_path, error = %e, "Unparsable cache metadata, treating as miss");
                return None;
            }
        };

        let payload = fs::read(&data_path).await.ok()?;

        Some((Bytes::from(payload), metadata))
    }

    async fn save(&self, key: &str, payload: Bytes, mut metadata: EntryMetadata) -> io::Result<()> {
        if metadata.stored_at.is_none() {
            metadata.stored_at = Some(epoch_seconds());
        }

        let metadata_json = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let data_path = self.data_path(key);
        let meta_path = self.meta_path(key);
        let tmp_data_path = self.cache_dir.join(format!("{key}.bin.tmp"));
        let tmp_meta_path = self.cache_dir.join(format!("{key}.meta.tmp"));

        let _guard = self.lock.lock().await;

        // Stage both halves, then rename into place, so an interrupted
        // save never leaves a half-written entry visible.
        fs::write(&tmp_data_path, &payload).await?;

        if let Err(e) = fs::write(&tmp_meta_path, &metadata_json).await {
            let _ = fs::remove_file(&tmp_data_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_data_path, &data_path).await {
            let _ = fs::remove_file(&tmp_data_path).await;
            let _ = fs::remove_file(&tmp_meta_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_meta_path, &meta_path).await {
            let _ = fs::remove_file(&data_path).await;
            let _ = fs::remove_file(&tmp_meta_path).await;
            return Err(e);
        }

        debug!(key, "Cached preview entry");
        Ok(())
    }
}

/// Age of the entry behind `meta_path`, from its `stored_at` field, or
/// from the file's own mtime when the field is absent or non-numeric.
/// `None` means the entry could not be aged at all and should be left
/// alone.
async fn entry_age(meta_path: &std::path::Path, now: i64) -> Option<i64> {
    let meta_bytes = fs::read(meta_path).await.ok()?;
    let meta: serde_json::Value = serde_json::from_slice(&meta_bytes).ok()?;

    if !meta.is_object() {
        return None;
    }

    if let Some(stored_at) = meta.get("stored_at").and_then(serde_json::Value::as_i64) {
        return Some(now - stored_at);
    }

    let modified = fs::metadata(meta_path).await.ok()?.modified().ok()?;
    let mtime = modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    Some(now - mtime)
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::derive_key;

    #[inline]
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn meta(resource_url: &str) -> EntryMetadata {
        EntryMetadata::new(resource_url, "image/png")
    }

    #[tokio::test]
    async fn round_trip_injects_stored_at() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        let key = derive_key("owner/repo");
        let payload = Bytes::from_static(b"payload bytes");
        store
            .save(&key, payload.clone(), meta("https://example.com/card.png"))
            .await
            .unwrap();

        let (loaded, loaded_meta) = store.load(&key).await.unwrap();
        assert_eq!(loaded, payload);
        assert_eq!(loaded_meta.resource_url, "https://example.com/card.png");
        assert!(loaded_meta.stored_at.is_some());
    }

    #[tokio::test]
    async fn explicit_stored_at_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        let mut metadata = meta("https://example.com/card.png");
        metadata.stored_at = Some(1_700_000_000);
        store
            .save("key", Bytes::from_static(b"x"), metadata)
            .await
            .unwrap();

        let (_, loaded) = store.load("key").await.unwrap();
        assert_eq!(loaded.stored_at, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn resaving_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        let first = meta("https://example.com/old.png").with_etag_option(Some("\"v1\"".into()));
        store.save("key", Bytes::from_static(b"old"), first).await.unwrap();

        let second = meta("https://example.com/new.png");
        store.save("key", Bytes::from_static(b"new"), second).await.unwrap();

        let (payload, loaded) = store.load("key").await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"new"));
        assert_eq!(loaded.resource_url, "https://example.com/new.png");
        assert!(loaded.etag.is_none());
    }

    #[tokio::test]
    async fn resaving_identical_entry_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();
        let payload = Bytes::from_static(b"same payload");

        store
            .save("key", payload.clone(), meta("https://example.com/a.png"))
            .await
            .unwrap();
        let (first_payload, first_meta) = store.load("key").await.unwrap();

        store
            .save("key", payload.clone(), meta("https://example.com/a.png"))
            .await
            .unwrap();
        let (second_payload, second_meta) = store.load("key").await.unwrap();

        // Equal in everything but the injected timestamp.
        assert_eq!(first_payload, second_payload);
        assert_eq!(first_meta.resource_url, second_meta.resource_url);
        assert_eq!(first_meta.etag, second_meta.etag);
        assert_eq!(first_meta.content_type, second_meta.content_type);
        assert_eq!(first_meta.extra, second_meta.extra);
    }

    #[tokio::test]
    async fn missing_half_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        store
            .save("key", Bytes::from_static(b"x"), meta("https://example.com/a.png"))
            .await
            .unwrap();
        tokio::fs::remove_file(dir.path().join("key.bin")).await.unwrap();

        assert!(store.load("key").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_metadata_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        store
            .save("key", Bytes::from_static(b"x"), meta("https://example.com/a.png"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("key.meta"), b"not json at all")
            .await
            .unwrap();

        assert!(store.load("key").await.is_none());
    }

    #[tokio::test]
    async fn eviction_removes_only_entries_past_ttl() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();
        let ttl = 3600;
        let now = epoch_seconds();

        let mut expired = meta("https://example.com/old.png");
        expired.stored_at = Some(now - ttl - 1);
        store.save("old", Bytes::from_static(b"old"), expired).await.unwrap();

        let mut fresh = meta("https://example.com/new.png");
        fresh.stored_at = Some(now - ttl + 1);
        store.save("new", Bytes::from_static(b"new"), fresh).await.unwrap();

        assert_eq!(store.evict_expired(ttl).await, 1);
        assert!(store.load("old").await.is_none());
        assert!(store.load("new").await.is_some());
    }

    #[tokio::test]
    async fn zero_ttl_disables_eviction() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        let mut metadata = meta("https://example.com/a.png");
        metadata.stored_at = Some(0);
        store.save("ancient", Bytes::from_static(b"x"), metadata).await.unwrap();

        assert_eq!(store.evict_expired(0).await, 0);
        assert_eq!(store.evict_expired(-1).await, 0);
        assert!(store.load("ancient").await.is_some());
    }

    #[tokio::test]
    async fn eviction_removes_both_halves() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        let mut metadata = meta("https://example.com/a.png");
        metadata.stored_at = Some(1);
        store.save("stale", Bytes::from_static(b"x"), metadata).await.unwrap();

        assert_eq!(store.evict_expired(60).await, 1);
        assert!(!dir.path().join("stale.bin").exists());
        assert!(!dir.path().join("stale.meta").exists());
    }

    #[tokio::test]
    async fn eviction_skips_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCache::open(dir.path()).await.unwrap();

        tokio::fs::write(dir.path().join("README.txt"), b"keep me")
            .await
            .unwrap();

        assert_eq!(store.evict_expired(60).await, 0);
        assert!(dir.path().join("README.txt").exists());
    }

    #[tokio::test]
    async fn open_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = DiskCache::open(&nested).await.unwrap();
        assert!(nested.is_dir());

        store
            .save("key", Bytes::from_static(b"x"), meta("https://example.com/a.png"))
            .await
            .unwrap();
        assert!(store.load("key").await.is_some());
    }
}
