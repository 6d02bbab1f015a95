//! Knob Keeper - form control values that survive a page reload
//!
//! Core modules:
//! - `record`: Persisted record (control id -> value) and its JSON form
//! - `control`: Tracked control abstraction and value capability
//! - `storage`: Key-value storage (LocalStorage on web, in-memory natively)
//! - `config`: Synchronizer configuration and presets
//! - `sync`: Restore on page-ready, save on change
//! - `web`: Browser binding and JS exports (WASM only)

pub mod config;
pub mod control;
pub mod record;
pub mod storage;
pub mod sync;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{CompanionPolicy, ControlSelector, SyncConfig};
pub use control::{Control, HasStringValue, MemoryControl};
pub use record::PersistedRecord;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use sync::{RestoreReport, Synchronizer, build_snapshot};
