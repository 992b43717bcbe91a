//! Append-only journal, one file per preference space
//!
//! Write ordering contract: [`JournalWriter::append`] must return before
//! the caller updates its RAM table. In the durable profile the append
//! includes a platform flush, so an entry acknowledged to the caller will
//! be replayed after a crash.
//!
//! Replay tolerates a dirty tail: a corrupt record is skipped by scanning
//! forward for the next magic marker, and a torn record at end of file —
//! the crash point — stops replay cleanly.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use prefstore_core::{PrefError, PrefResult, Scalar};

use crate::format::{
    deserialize_record, record_len, serialize_record, JournalRecord, RecordOp, HEADER_SIZE,
    MAGIC_ARRAY,
};
use crate::sync::flush_to_disk;

/// Appends records to a space's journal file.
pub struct JournalWriter {
    file: File,
    path: PathBuf,
    durable: bool,
}

impl JournalWriter {
    /// Open (or create) the journal at `path` for appending.
    pub fn open(path: &Path, durable: bool) -> PrefResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PrefError::Io {
                path: Some(path.to_path_buf()),
                kind: e.kind(),
                message: format!("Failed to open journal: {}", e),
            })?;

        Ok(Self { file, path: path.to_path_buf(), durable })
    }

    /// Append one record. With the durable profile, the record is flushed
    /// to persistent storage before this returns.
    pub fn append(&mut self, op: RecordOp, key: &str, value: Option<&Scalar>) -> PrefResult<()> {
        let bytes = serialize_record(op, key, value)?;

        self.file.write_all(&bytes).map_err(|e| PrefError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Journal write failed: {}", e),
        })?;

        if self.durable {
            self.sync()?;
        }
        Ok(())
    }

    /// Flush all appended records to persistent storage in one go.
    pub fn sync(&self) -> PrefResult<()> {
        flush_to_disk(&self.file).map_err(|e| PrefError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Journal flush failed: {}", e),
        })
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Replay every decodable record from the journal at `path`, in write order.
///
/// A missing file replays as empty. Corrupt records are skipped with a
/// forward scan for the next magic marker; a torn record at the tail stops
/// replay without failing the open.
pub fn replay(path: &Path) -> PrefResult<Vec<JournalRecord>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(PrefError::Io {
                path: Some(path.to_path_buf()),
                kind: e.kind(),
                message: format!("Failed to open journal for replay: {}", e),
            })
        }
    };

    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).map_err(|e| PrefError::Io {
        path: Some(path.to_path_buf()),
        kind: e.kind(),
        message: format!("Failed to read journal: {}", e),
    })?;

    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset + HEADER_SIZE <= buffer.len() {
        if buffer[offset..offset + 4] != MAGIC_ARRAY {
            // Not a record start — resync on the next magic marker
            eprintln!("[JOURNAL REPLAY] Bad magic at offset {}, scanning forward", offset);
            match find_next_magic(&buffer, offset + 1) {
                Some(next) => {
                    offset = next;
                    continue;
                }
                None => break,
            }
        }

        let total = match record_len(&buffer[offset..]) {
            Some(total) => total,
            None => break,
        };

        if offset + total > buffer.len() {
            // Torn record — the journal ends mid-write. This is the crash
            // point; everything before it is intact.
            eprintln!(
                "[JOURNAL REPLAY] Torn record at offset {}: need {} bytes, have {}",
                offset,
                total,
                buffer.len() - offset
            );
            break;
        }

        match deserialize_record(&buffer[offset..offset + total], offset as u64) {
            Ok(record) => {
                records.push(record);
                offset += total;
            }
            Err(e) => {
                eprintln!("[JOURNAL REPLAY] Corrupt record at offset {}: {}", offset, e);
                match find_next_magic(&buffer, offset + 1) {
                    Some(next) => offset = next,
                    None => break,
                }
            }
        }
    }

    Ok(records)
}

/// Rewrite the journal as a snapshot of `entries`, dropping dead records.
///
/// Writes a temp file next to the journal and renames it into place, so a
/// crash mid-compaction leaves either the old journal or the new one —
/// never a half-written file under the live name.
pub fn rewrite(path: &Path, entries: &HashMap<String, Scalar>, durable: bool) -> PrefResult<()> {
    let tmp_path = path.with_extension("prefs.tmp");

    {
        let mut tmp = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| PrefError::Io {
                path: Some(tmp_path.clone()),
                kind: e.kind(),
                message: format!("Failed to create compaction file: {}", e),
            })?;

        for (key, value) in entries {
            let bytes = serialize_record(RecordOp::Put, key, Some(value))?;
            tmp.write_all(&bytes).map_err(|e| PrefError::Io {
                path: Some(tmp_path.clone()),
                kind: e.kind(),
                message: format!("Compaction write failed: {}", e),
            })?;
        }

        if durable {
            flush_to_disk(&tmp).map_err(|e| PrefError::Io {
                path: Some(tmp_path.clone()),
                kind: e.kind(),
                message: format!("Compaction flush failed: {}", e),
            })?;
        }
    }

    std::fs::rename(&tmp_path, path).map_err(|e| PrefError::Io {
        path: Some(path.to_path_buf()),
        kind: e.kind(),
        message: format!("Failed to swap compacted journal into place: {}", e),
    })
}

/// Scan forward in the buffer for the next PRFS magic marker.
fn find_next_magic(buffer: &[u8], start: usize) -> Option<usize> {
    for i in start..buffer.len().saturating_sub(3) {
        if buffer[i..i + 4] == MAGIC_ARRAY {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn journal_path(dir: &TempDir) -> PathBuf {
        dir.path().join("space.prefs")
    }

    #[test]
    fn test_append_replay_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = journal_path(&dir);

        let mut writer = JournalWriter::open(&path, true).unwrap();
        assert!(writer.path().ends_with("space.prefs"));
        writer.append(RecordOp::Put, "k1", Some(&Scalar::Int(1))).unwrap();
        writer.append(RecordOp::Put, "k2", Some(&Scalar::String("two".into()))).unwrap();
        writer.append(RecordOp::Remove, "k1", None).unwrap();
        drop(writer);

        let records = replay(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].key, "k1");
        assert_eq!(records[0].value, Some(Scalar::Int(1)));
        assert_eq!(records[1].value, Some(Scalar::String("two".into())));
        assert_eq!(records[2].op, RecordOp::Remove);
    }

    #[test]
    fn test_replay_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = replay(&journal_path(&dir)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_remove_all_record_survives_replay() {
        let dir = TempDir::new().unwrap();
        let path = journal_path(&dir);

        let mut writer = JournalWriter::open(&path, true).unwrap();
        writer.append(RecordOp::Put, "k", Some(&Scalar::Boolean(true))).unwrap();
        writer.append(RecordOp::RemoveAll, "", None).unwrap();
        drop(writer);

        let records = replay(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].op, RecordOp::RemoveAll);
    }

    #[test]
    fn test_corrupt_record_skipped_with_resync() {
        let dir = TempDir::new().unwrap();
        let path = journal_path(&dir);

        let mut writer = JournalWriter::open(&path, true).unwrap();
        writer.append(RecordOp::Put, "good1", Some(&Scalar::Int(1))).unwrap();
        writer.append(RecordOp::Put, "good2", Some(&Scalar::Int(2))).unwrap();
        writer.append(RecordOp::Put, "good3", Some(&Scalar::Int(3))).unwrap();
        drop(writer);

        // Records are 20 + 5 + 4 = 29 bytes each; corrupt the second payload
        let mut data = std::fs::read(&path).unwrap();
        data[29 + HEADER_SIZE] ^= 0xFF;
        std::fs::write(&path, data).unwrap();

        let records = replay(&path).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["good1", "good3"]);
    }

    #[test]
    fn test_torn_tail_stops_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = journal_path(&dir);

        let mut writer = JournalWriter::open(&path, true).unwrap();
        writer.append(RecordOp::Put, "complete", Some(&Scalar::Long(7))).unwrap();
        drop(writer);

        // Simulate a crash mid-append: a full header whose lengths point
        // past end of file, with no payload behind it
        let mut data = std::fs::read(&path).unwrap();
        data.extend_from_slice(&MAGIC_ARRAY);
        data.extend_from_slice(&8u16.to_le_bytes()); // key_len
        data.extend_from_slice(&255u32.to_le_bytes()); // value_len
        data.extend_from_slice(&[0u8; 10]); // checksum + op + kind + reserved
        std::fs::write(&path, data).unwrap();

        let records = replay(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "complete");
    }

    #[test]
    fn test_rewrite_drops_dead_records() {
        let dir = TempDir::new().unwrap();
        let path = journal_path(&dir);

        let mut writer = JournalWriter::open(&path, true).unwrap();
        for i in 0..10 {
            writer.append(RecordOp::Put, "hot_key", Some(&Scalar::Int(i))).unwrap();
        }
        writer.append(RecordOp::Put, "other", Some(&Scalar::Boolean(true))).unwrap();
        drop(writer);

        let mut live = HashMap::new();
        live.insert("hot_key".to_string(), Scalar::Int(9));
        live.insert("other".to_string(), Scalar::Boolean(true));
        rewrite(&path, &live, true).unwrap();

        let records = replay(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.op == RecordOp::Put));
    }
}
