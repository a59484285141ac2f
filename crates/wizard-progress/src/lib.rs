//! Wizard Progress - best-effort preservation of in-progress wizard data
//!
//! - [`KeyValueStore`]: the persistence medium (synchronous get/set, may run out of quota)
//! - [`MemoryStore`] / [`FileStore`]: in-process and on-disk media
//! - [`ProgressSnapshot`]: form data, step data and navigation history of one run
//! - [`ProgressStore`]: single-attempt, fail-soft save/load keyed by workflow id

#![warn(unreachable_pub)]

pub mod adapter;
pub mod error;
pub mod snapshot;
pub mod store;

pub use adapter::{storage_key, ProgressStore, KEY_PREFIX};
pub use error::StoreError;
pub use snapshot::{FieldMap, NavigationEntry, ProgressSnapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore};
