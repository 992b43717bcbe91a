//! Read-side view over one preference space
//!
//! A [`PrefStore`] is a synchronous, read-only handle: existence checks and
//! typed reads with default-value fallback. All modifications go through a
//! [`PrefEditor`] obtained from [`edit()`](PrefStore::edit) so that pending
//! changes stay consistent and commit as one batch.

use std::sync::Arc;

use crate::adapter::StorageAdapter;
use crate::editor::PrefEditor;
use crate::value::{Scalar, ScalarKind};

/// Handle to a named space of preference entries.
///
/// Cloning a `PrefStore` clones the handle, not the data: clones (and any
/// other handle constructed over the same adapter) observe the same
/// underlying entries.
///
/// Typed reads never fail. An absent key returns the caller's default, and
/// so does a key whose stored value has a different kind — mismatch is
/// deliberately folded into absence so behavior stays uniform across
/// backings with differing type fidelity.
#[derive(Clone)]
pub struct PrefStore {
    adapter: Arc<dyn StorageAdapter>,
}

impl PrefStore {
    /// Create a store over the given backing adapter.
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self { adapter }
    }

    /// Checks whether the space contains a preference for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.adapter.contains(key)
    }

    /// Retrieve a boolean preference, or `def_value` if absent.
    pub fn get_boolean(&self, key: &str, def_value: bool) -> bool {
        match self.adapter.read(key, ScalarKind::Boolean) {
            Some(Scalar::Boolean(v)) => v,
            _ => def_value,
        }
    }

    /// Retrieve a float preference, or `def_value` if absent.
    pub fn get_float(&self, key: &str, def_value: f32) -> f32 {
        match self.adapter.read(key, ScalarKind::Float) {
            Some(Scalar::Float(v)) => v,
            _ => def_value,
        }
    }

    /// Retrieve an int preference, or `def_value` if absent.
    pub fn get_int(&self, key: &str, def_value: i32) -> i32 {
        match self.adapter.read(key, ScalarKind::Int) {
            Some(Scalar::Int(v)) => v,
            _ => def_value,
        }
    }

    /// Retrieve a long preference, or `def_value` if absent.
    pub fn get_long(&self, key: &str, def_value: i64) -> i64 {
        match self.adapter.read(key, ScalarKind::Long) {
            Some(Scalar::Long(v)) => v,
            _ => def_value,
        }
    }

    /// Retrieve a string preference, or `def_value` if absent.
    pub fn get_string(&self, key: &str, def_value: &str) -> String {
        match self.adapter.read(key, ScalarKind::String) {
            Some(Scalar::String(v)) => v,
            _ => def_value.to_string(),
        }
    }

    /// Create a new [`PrefEditor`] bound to this store.
    ///
    /// Each call returns a fresh editor with an empty pending batch.
    /// Editors are single-writer: staging calls from multiple threads on
    /// one editor are undefined unless externally synchronized.
    pub fn edit(&self) -> PrefEditor {
        PrefEditor::new(Arc::clone(&self.adapter))
    }
}

impl std::fmt::Debug for PrefStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefStore").finish()
    }
}
