//! Run orchestration: listing, eviction, dispatch, collection.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, DiskCache};
use crate::config::PreviewConfig;
use crate::error::PreviewError;
use crate::github;
use crate::pipeline::{self, FetchOutcome};
use crate::pool;
use crate::session::SessionPool;

/// Orchestrates one preview collection run.
///
/// Holds nothing but the configuration; every run opens its own cache
/// and session pool, so no state leaks between runs.
pub struct PreviewManager {
    config: PreviewConfig,
}

impl PreviewManager {
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Convenience constructor for a default-configured run.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self::new(PreviewConfig::for_owner(owner))
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Collect the preview image of every repository belonging to the
    /// configured owner.
    ///
    /// Returns name → payload for the repositories that produced a
    /// usable image. Skipped repositories are omitted silently; failed
    /// ones are logged and omitted, and never abort the rest of the
    /// run.
    pub async fn run(&self) -> Result<HashMap<String, Bytes>, PreviewError> {
        if self.config.owner.trim().is_empty() {
            return Err(PreviewError::Configuration("owner is not set".to_owned()));
        }

        let cache = if self.config.use_cache {
            let store = DiskCache::open(&self.config.cache_dir).await?;
            let removed = store.evict_expired(self.config.cache_ttl_seconds).await;
            if removed > 0 {
                info!(removed, "Cache eviction removed expired entries");
            }
            Some(Arc::new(store))
        } else {
            None
        };

        let sessions = Arc::new(SessionPool::new(&self.config));

        let names = github::list_repo_names(&sessions.client_for(0)?, &self.config).await?;
        info!(
            owner = %self.config.owner,
            repos = names.len(),
            workers = self.config.max_workers,
            "Dispatching preview fetches"
        );

        let config = Arc::new(self.config.clone());
        let outcomes = pool::dispatch(names, self.config.max_workers, move |worker_id, name: String| {
            let sessions = Arc::clone(&sessions);
            let cache = cache.clone();
            let config = Arc::clone(&config);

            async move {
                let store = cache.as_deref().map(|store| store as &dyn CacheStore);
                let outcome = pipeline::fetch_one(&sessions, worker_id, &name, store, &config).await;
                (name, outcome)
            }
        })
        .await;

        let mut previews = HashMap::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(FetchOutcome::Fetched(payload)) => {
                    previews.insert(name, payload);
                }
                Ok(FetchOutcome::Skipped(reason)) => {
                    debug!(repo = %name, ?reason, "No usable preview");
                }
                Err(e) => {
                    warn!(repo = %name, error = %e, "Skipping repository after fetch error");
                }
            }
        }

        Ok(previews)
    }
}
