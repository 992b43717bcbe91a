//! File-backed storage adapter
//!
//! One journal file per preference space. Reads are served from a RAM
//! hash table replayed at open; every mutation is journaled before the
//! RAM table changes, so an acknowledged write is recoverable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use prefstore_core::{
    PrefError, PrefResult, Scalar, ScalarKind, SpaceRegistry, StorageAdapter,
};

use crate::config::Config;
use crate::format::RecordOp;
use crate::journal::{replay, rewrite, JournalWriter};

/// Durable adapter for one preference space.
///
/// WRITE ORDERING (the fundamental contract):
/// 1. Journal append (with platform flush in the durable profile)
/// 2. RAM update
///
/// If the journal append fails, RAM is never modified — the caller's
/// retry replays the same mutation.
pub struct FileAdapter {
    /// RAM working set — concurrent reads via RwLock
    data: RwLock<HashMap<String, Scalar>>,
    /// Journal — single writer via Mutex
    journal: Mutex<JournalWriter>,
    /// Journal file path
    path: PathBuf,
}

impl FileAdapter {
    /// Open (or create) the journal-backed space `space` under `dir`.
    ///
    /// Replays the journal into RAM, compacting it first when the
    /// dead-record ratio crosses the configured threshold.
    pub fn open(dir: &Path, space: &str, config: &Config) -> PrefResult<Self> {
        config.validate().map_err(|reason| PrefError::Precondition {
            message: format!("invalid file adapter config: {}", reason),
        })?;
        validate_space_name(space)?;

        std::fs::create_dir_all(dir).map_err(|e| PrefError::Io {
            path: Some(dir.to_path_buf()),
            kind: e.kind(),
            message: format!("Failed to create preference directory: {}", e),
        })?;

        let path = dir.join(format!("{}.prefs", space));

        // Replay journal into RAM
        let records = replay(&path)?;
        let mut data = HashMap::new();
        for record in &records {
            match record.op {
                RecordOp::Put => {
                    if let Some(value) = &record.value {
                        data.insert(record.key.clone(), value.clone());
                    }
                }
                RecordOp::Remove => {
                    data.remove(&record.key);
                }
                RecordOp::RemoveAll => {
                    data.clear();
                }
            }
        }

        if !data.is_empty() {
            eprintln!(
                "[prefstore] Recovered {} entries from {}",
                data.len(),
                path.display()
            );
        }

        // Compact when most of the journal is dead weight
        let total = records.len();
        let dead = total.saturating_sub(data.len());
        if total > 0 && (dead as f64 / total as f64) > config.compaction_trigger_ratio {
            rewrite(&path, &data, config.durable_writes)?;
        }

        let journal = JournalWriter::open(&path, config.durable_writes)?;

        Ok(Self {
            data: RwLock::new(data),
            journal: Mutex::new(journal),
            path,
        })
    }

    /// Flush all journaled writes to persistent storage.
    ///
    /// Only meaningful with the batched profile; in the durable profile
    /// every append already flushed.
    pub fn sync(&self) -> PrefResult<()> {
        self.journal.lock().sync()
    }

    /// Number of entries in this space.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if the space holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageAdapter for FileAdapter {
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
        {
            let mut journal = self.journal.lock();
            journal.append(RecordOp::Put, key, Some(&value))?;
        }
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> PrefResult<()> {
        // Removing an absent key stays a no-op and keeps the journal lean
        if !self.data.read().contains_key(key) {
            return Ok(());
        }
        {
            let mut journal = self.journal.lock();
            journal.append(RecordOp::Remove, key, None)?;
        }
        self.data.write().remove(key);
        Ok(())
    }

    fn remove_all(&self) -> PrefResult<()> {
        {
            let mut journal = self.journal.lock();
            journal.append(RecordOp::RemoveAll, "", None)?;
        }
        self.data.write().clear();
        Ok(())
    }
}

impl std::fmt::Debug for FileAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAdapter")
            .field("path", &self.path)
            .field("entries", &self.len())
            .finish()
    }
}

/// A space name becomes a file name; reject anything that could escape
/// the preference directory.
fn validate_space_name(space: &str) -> PrefResult<()> {
    let bad = space.is_empty()
        || space == "."
        || space == ".."
        || space.contains('/')
        || space.contains('\\');
    if bad {
        return Err(PrefError::Precondition {
            message: format!("invalid space name: {:?}", space),
        });
    }
    Ok(())
}

/// Build a [`SpaceRegistry`] that backs every space with a journal file
/// under `dir`.
pub fn file_registry(dir: impl Into<PathBuf>, config: Config) -> SpaceRegistry {
    let dir = dir.into();
    SpaceRegistry::new(Box::new(move |space| {
        let adapter = FileAdapter::open(&dir, space, &config)?;
        Ok(Arc::new(adapter) as Arc<dyn StorageAdapter>)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_space(dir: &TempDir) -> FileAdapter {
        FileAdapter::open(dir.path(), "settings", &Config::durable()).unwrap()
    }

    #[test]
    fn test_open_empty() {
        let dir = TempDir::new().unwrap();
        let adapter = open_space(&dir);
        assert!(adapter.is_empty());
        assert!(adapter.path().ends_with("settings.prefs"));
    }

    #[test]
    fn test_write_read_remove() {
        let dir = TempDir::new().unwrap();
        let adapter = open_space(&dir);

        adapter.write("k", Scalar::Float(2.5)).unwrap();
        assert!(adapter.contains("k"));
        assert_eq!(adapter.read("k", ScalarKind::Float), Some(Scalar::Float(2.5)));
        assert_eq!(adapter.read("k", ScalarKind::Int), None);

        adapter.remove("k").unwrap();
        assert!(!adapter.contains("k"));
    }

    #[test]
    fn test_replay_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let adapter = open_space(&dir);
            adapter.write("survives", Scalar::Long(1)).unwrap();
            adapter.write("doomed", Scalar::Boolean(true)).unwrap();
            adapter.remove("doomed").unwrap();
        }
        {
            let adapter = open_space(&dir);
            assert_eq!(adapter.read("survives", ScalarKind::Long), Some(Scalar::Long(1)));
            assert!(!adapter.contains("doomed"));
            assert_eq!(adapter.len(), 1);
        }
    }

    #[test]
    fn test_remove_all_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let adapter = open_space(&dir);
            adapter.write("a", Scalar::Int(1)).unwrap();
            adapter.write("b", Scalar::Int(2)).unwrap();
            adapter.remove_all().unwrap();
            adapter.write("c", Scalar::Int(3)).unwrap();
        }
        {
            let adapter = open_space(&dir);
            assert_eq!(adapter.len(), 1);
            assert_eq!(adapter.read("c", ScalarKind::Int), Some(Scalar::Int(3)));
        }
    }

    #[test]
    fn test_compaction_shrinks_journal() {
        let dir = TempDir::new().unwrap();
        {
            let adapter = open_space(&dir);
            for i in 0..50 {
                adapter.write("churn", Scalar::Int(i)).unwrap();
            }
        }
        let before = std::fs::metadata(dir.path().join("settings.prefs")).unwrap().len();

        // 49 of 50 records are dead: reopen must compact
        {
            let adapter = open_space(&dir);
            assert_eq!(adapter.read("churn", ScalarKind::Int), Some(Scalar::Int(49)));
        }
        let after = std::fs::metadata(dir.path().join("settings.prefs")).unwrap().len();
        assert!(after < before, "journal should shrink: {} -> {}", before, after);

        // And the compacted journal still replays correctly
        let adapter = open_space(&dir);
        assert_eq!(adapter.read("churn", ScalarKind::Int), Some(Scalar::Int(49)));
    }

    #[test]
    fn test_invalid_space_names_rejected() {
        let dir = TempDir::new().unwrap();
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            let result = FileAdapter::open(dir.path(), bad, &Config::durable());
            assert!(
                matches!(result, Err(PrefError::Precondition { .. })),
                "space name {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_batched_profile_sync() {
        let dir = TempDir::new().unwrap();
        let adapter =
            FileAdapter::open(dir.path(), "settings", &Config::batched()).unwrap();
        adapter.write("k", Scalar::Boolean(true)).unwrap();
        adapter.sync().unwrap();
        assert!(adapter.contains("k"));
    }
}
