//! Integration tests: the Store/Editor protocol over the file backing.
//!
//! These exercise the full registry -> PrefStore -> PrefEditor -> journal
//! pipeline, including restart durability and dirty-journal recovery.

use std::sync::Arc;

use tempfile::TempDir;

use prefstore_core::{PrefStore, StorageAdapter};
use prefstore_file::{file_registry, Config, FileAdapter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_store(dir: &TempDir) -> PrefStore {
    file_registry(dir.path(), Config::durable())
        .open_default()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Store/Editor protocol over the file backing
// ---------------------------------------------------------------------------

#[test]
fn test_put_apply_get_all_types() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.edit()
        .put_boolean("b", true)
        .put_float("f", 30.0)
        .put_int("i", -12)
        .put_long("l", 9_000_000_000)
        .put_string("s", "test_value")
        .apply()
        .unwrap();

    assert!(store.get_boolean("b", false));
    assert_eq!(store.get_float("f", 1.0), 30.0);
    assert_eq!(store.get_int("i", 0), -12);
    assert_eq!(store.get_long("l", 0), 9_000_000_000);
    assert_eq!(store.get_string("s", "default"), "test_value");
}

#[test]
fn test_no_apply_no_persist() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut editor = store.edit();
    editor.put_int("k", 7);
    drop(editor);

    assert_eq!(store.get_int("k", 1), 1);
    assert!(!store.contains("k"));
}

#[test]
fn test_clear_runs_before_same_batch_puts() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    store.edit().put_string("old", "wiped").apply().unwrap();

    let mut editor = store.edit();
    editor.put_boolean("K", true);
    editor.clear();
    editor.apply().unwrap();

    assert!(store.get_boolean("K", false));
    assert!(!store.contains("old"));
}

#[test]
fn test_remove_and_clear_across_commits() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.edit().put_boolean("k1", true).put_int("k2", 2).apply().unwrap();
    store.edit().remove("k1").apply().unwrap();
    assert!(!store.get_boolean("k1", false));
    assert_eq!(store.get_int("k2", 0), 2);

    store.edit().clear().apply().unwrap();
    assert!(!store.contains("k2"));
}

#[test]
fn test_type_mismatch_degrades_to_default() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store.edit().put_string("k", "not a number").apply().unwrap();
    assert_eq!(store.get_int("k", 5), 5);
    assert!(store.contains("k"));
}

// ---------------------------------------------------------------------------
// Registry and space semantics
// ---------------------------------------------------------------------------

#[test]
fn test_same_space_handles_share_data() {
    let dir = TempDir::new().unwrap();
    let registry = file_registry(dir.path(), Config::durable());

    let a = registry.open("shared").unwrap();
    let b = registry.open("shared").unwrap();

    a.edit().put_long("k", 4).apply().unwrap();
    assert_eq!(b.get_long("k", 0), 4);
}

#[test]
fn test_spaces_are_isolated_on_disk() {
    let dir = TempDir::new().unwrap();
    let registry = file_registry(dir.path(), Config::durable());

    let alpha = registry.open("alpha").unwrap();
    let beta = registry.open("beta").unwrap();

    alpha.edit().put_boolean("k", true).apply().unwrap();
    assert!(!beta.contains("k"));

    assert!(dir.path().join("alpha.prefs").exists());
    assert!(dir.path().join("beta.prefs").exists());
}

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

#[test]
fn test_applied_batch_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = test_store(&dir);
        store.edit()
            .put_string("name", "alice")
            .put_int("visits", 3)
            .apply()
            .unwrap();
        store.edit().remove("visits").apply().unwrap();
    }
    {
        // Fresh registry over the same directory: journal replay
        let store = test_store(&dir);
        assert_eq!(store.get_string("name", ""), "alice");
        assert_eq!(store.get_int("visits", -1), -1);
    }
}

#[test]
fn test_clear_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = test_store(&dir);
        store.edit().put_boolean("k", true).apply().unwrap();
        store.edit().clear().apply().unwrap();
    }
    {
        let store = test_store(&dir);
        assert!(!store.get_boolean("k", false));
    }
}

#[test]
fn test_corrupt_record_does_not_take_down_the_space() {
    let dir = TempDir::new().unwrap();
    {
        let store = test_store(&dir);
        // Keys chosen so every record is 20 + 2 + 2 = 24 bytes
        store.edit().put_string("a1", "v1").apply().unwrap();
        store.edit().put_string("a2", "v2").apply().unwrap();
        store.edit().put_string("a3", "v3").apply().unwrap();
    }

    // Flip a byte in the second record's payload
    let path = dir.path().join("default.prefs");
    let mut data = std::fs::read(&path).unwrap();
    data[24 + 21] ^= 0xFF;
    std::fs::write(&path, data).unwrap();

    let store = test_store(&dir);
    assert_eq!(store.get_string("a1", "gone"), "v1");
    assert_eq!(store.get_string("a2", "gone"), "gone");
    assert_eq!(store.get_string("a3", "gone"), "v3");
}

#[test]
fn test_batched_profile_with_explicit_sync() {
    let dir = TempDir::new().unwrap();

    let adapter = Arc::new(
        FileAdapter::open(dir.path(), "fast", &Config::batched()).unwrap(),
    );
    let store = PrefStore::new(Arc::clone(&adapter) as Arc<dyn StorageAdapter>);

    store.edit().put_int("k", 1).put_int("k", 2).apply().unwrap();
    adapter.sync().unwrap();

    assert_eq!(store.get_int("k", 0), 2);

    drop(store);
    drop(adapter);
    let reopened = FileAdapter::open(dir.path(), "fast", &Config::batched()).unwrap();
    let store = PrefStore::new(Arc::new(reopened) as Arc<dyn StorageAdapter>);
    assert_eq!(store.get_int("k", 0), 2);
}
