//! # Preview Cache
//!
//! Disk-backed storage for fetched preview images. Each entry is a
//! payload/metadata file pair addressed by a filename-safe key derived
//! from the repository identity.

mod key;
mod store;
mod types;

pub use key::derive_key;
pub use store::{CacheStore, DiskCache};
pub use types::EntryMetadata;
