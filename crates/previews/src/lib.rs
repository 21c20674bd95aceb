//! # Previews Engine
//!
//! A library for collecting the social preview images advertised by a
//! GitHub account's repositories. Built around a concurrent
//! fetch-and-cache pipeline:
//!
//! - Disk cache with ETag-based conditional revalidation
//! - Fixed-size worker pool with per-worker HTTP sessions
//! - Per-item failure isolation with completion-order collection
//! - Time-based cache expiry

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod github;
pub mod manager;
pub mod pipeline;
pub mod pool;
pub mod session;

pub use builder::PreviewConfigBuilder;
pub use cache::{CacheStore, DiskCache, EntryMetadata, derive_key};
pub use config::PreviewConfig;
pub use error::PreviewError;
pub use manager::PreviewManager;
pub use pipeline::{FetchOutcome, SkipReason};
pub use session::SessionPool;
