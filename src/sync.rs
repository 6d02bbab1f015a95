//! Form-value persistence synchronizer
//!
//! Restores stored values into tracked controls on page-ready and rewrites
//! the full snapshot of tracked values on every change. Nothing here ever
//! fails the page: storage problems degrade to "no prior values" and are
//! logged.

use crate::config::SyncConfig;
use crate::control::Control;
use crate::record::PersistedRecord;
use crate::storage::{KeyValueStore, StorageError};

/// Snapshot `id -> current value` of every control
///
/// Controls without an id or without a value are left out.
pub fn build_snapshot<C: Control>(controls: &[C]) -> PersistedRecord {
    controls
        .iter()
        .filter_map(|control| {
            let id = control.id();
            if id.is_empty() {
                return None;
            }
            let valued = control.value_capability()?;
            Some((id, valued.value()))
        })
        .collect()
}

/// Outcome of a restore pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    /// Controls whose value was set from storage
    pub restored: usize,
    /// Stored ids with no matching tracked control
    pub stale: usize,
    /// Companion displays updated alongside their control
    pub companions: usize,
}

/// Mirrors tracked control values into a key-value store
pub struct Synchronizer<S> {
    config: SyncConfig,
    store: S,
}

impl<S: KeyValueStore> Synchronizer<S> {
    pub fn new(config: SyncConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Select the tracked controls among `nodes`
    pub fn tracked<C: Control + Clone>(&self, nodes: &[C]) -> Vec<C> {
        nodes
            .iter()
            .filter(|node| self.config.selector.matches(*node))
            .cloned()
            .collect()
    }

    /// Load the stored record; absent or unreadable storage yields an empty one
    pub fn load(&self) -> PersistedRecord {
        match self.store.get_item(&self.config.storage_key) {
            Ok(Some(json)) => {
                let record = PersistedRecord::from_json(&json);
                log::info!(
                    "Loaded {} stored values from {}",
                    record.len(),
                    self.config.storage_key
                );
                record
            }
            Ok(None) => {
                log::info!("No stored values under {}", self.config.storage_key);
                PersistedRecord::new()
            }
            Err(e) => {
                log::warn!("{}, starting without stored values", e);
                PersistedRecord::new()
            }
        }
    }

    /// Load the stored record and apply it to `controls`
    pub fn restore<C: Control>(&self, controls: &[C]) -> RestoreReport {
        let record = self.load();
        let report = self.apply(&record, controls);
        log::info!(
            "Restored {} controls ({} companions, {} stale ids)",
            report.restored,
            report.companions,
            report.stale
        );
        report
    }

    /// Apply `record` to the matching controls
    ///
    /// Ids with no matching control are skipped, not pruned. A companion
    /// that is missing or rejected by the policy is skipped without
    /// affecting its control.
    pub fn apply<C: Control>(&self, record: &PersistedRecord, controls: &[C]) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (id, value) in record.iter() {
            let Some(control) = controls.iter().find(|c| c.id() == id) else {
                log::debug!("No tracked control for stored id {}", id);
                report.stale += 1;
                continue;
            };
            let Some(valued) = control.value_capability() else {
                log::debug!("Control {} has no value, skipping", id);
                continue;
            };

            valued.set_value(value);
            report.restored += 1;

            if let Some(companion) = control.previous_sibling() {
                if !self.config.companion.accepts(&companion) {
                    log::debug!("Sibling of {} is not a companion display", id);
                    continue;
                }
                if let Some(display) = companion.value_capability() {
                    display.set_value(&valued.value());
                    report.companions += 1;
                }
            }
        }

        report
    }

    /// Write the full snapshot of `controls`, replacing the stored record
    pub fn save<C: Control>(&self, controls: &[C]) -> Result<PersistedRecord, StorageError> {
        let snapshot = build_snapshot(controls);
        let json = snapshot.to_json()?;
        self.store.set_item(&self.config.storage_key, &json)?;
        Ok(snapshot)
    }

    /// Change handler: save the current snapshot, logging any failure
    pub fn on_change<C: Control>(&self, controls: &[C]) {
        match self.save(controls) {
            Ok(snapshot) => log::info!(
                "Saved {} values to {}",
                snapshot.len(),
                self.config.storage_key
            ),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Remove the stored record
    pub fn clear(&self) {
        match self.store.remove_item(&self.config.storage_key) {
            Ok(()) => log::info!("Cleared {}", self.config.storage_key),
            Err(e) => log::warn!("{}", e),
        }
    }
}
