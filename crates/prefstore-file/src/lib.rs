//! prefstore-file — durable file backing for preference spaces
//!
//! Implements `prefstore_core::StorageAdapter` over an append-only,
//! checksummed journal file, one file per preference space.
//!
//! # Architecture
//!
//! - **Read path**: served from a RAM hash table replayed from the journal
//!   at open
//! - **Write path**: journal-first — the record must be appended (and, in
//!   the durable profile, synced) before the RAM table is touched
//! - **Compaction**: when replay finds too many dead records, the journal
//!   is rewritten as a snapshot of the live entries via temp-file-and-rename

pub mod adapter;
pub mod config;
pub mod format;
pub mod journal;
pub mod sync;

// Re-export key types for convenience
pub use adapter::{file_registry, FileAdapter};
pub use config::Config;
pub use format::{JournalRecord, RecordOp};
pub use journal::JournalWriter;
