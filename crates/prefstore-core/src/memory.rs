//! In-memory adapters
//!
//! Two reference backings for tests, prototyping, and ephemeral spaces:
//!
//! - [`MemoryAdapter`] keeps typed values and answers a read only when the
//!   stored kind matches the requested kind.
//! - [`StringMemoryAdapter`] is the weakest-typed backing: every value is
//!   stored as text (the way a browser-local-storage backing would) and
//!   typed reads are satisfied by best-effort coercion.

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::adapter::StorageAdapter;
use crate::error::PrefResult;
use crate::value::{Scalar, ScalarKind};

/// Strongly-typed in-memory backing.
///
/// Reads and writes go through an RwLock — concurrent readers allowed,
/// writers serialized.
#[derive(Default)]
pub struct MemoryAdapter {
    data: RwLock<HashMap<String, Scalar>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if the space holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    fn read(&self, key: &str, kind: ScalarKind) -> Option<Scalar> {
        let data = self.data.read();
        match data.get(key) {
            Some(value) if value.kind() == kind => Some(value.clone()),
            _ => None,
        }
    }

    fn write(&self, key: &str, value: Scalar) -> PrefResult<()> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> PrefResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> PrefResult<()> {
        self.data.write().clear();
        Ok(())
    }
}

/// Text-only in-memory backing with read-side coercion.
///
/// Models a platform store where every value is a string. A typed read
/// parses the stored text as the requested kind and reads as absent when
/// the text does not parse.
#[derive(Default)]
pub struct StringMemoryAdapter {
    data: RwLock<HashMap<String, String>>,
}

impl StringMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for StringMemoryAdapter {
    fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    fn read(&self, key: &str, kind: ScalarKind) -> Option<Scalar> {
        let data = self.data.read();
        data.get(key).and_then(|text| Scalar::from_text(kind, text))
    }

    fn write(&self, key: &str, value: Scalar) -> PrefResult<()> {
        self.data.write().insert(key.to_string(), value.to_text());
        Ok(())
    }

    fn remove(&self, key: &str) -> PrefResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> PrefResult<()> {
        self.data.write().clear();
        Ok(())
    }
}
