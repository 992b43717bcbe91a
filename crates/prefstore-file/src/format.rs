//! Binary format for journal records
//!
//! Every record follows the same layout:
//! RecordHeader (20 bytes) + key_bytes + scalar payload
//!
//! Scalar payloads: boolean 1 byte, float/int 4 bytes LE, long 8 bytes LE,
//! string raw UTF-8. Remove and RemoveAll records carry no payload.

use prefstore_core::{PrefError, PrefResult, Scalar, ScalarKind};

/// Magic bytes identifying journal records: "PRFS" in ASCII
pub const MAGIC_ARRAY: [u8; 4] = [0x50, 0x52, 0x46, 0x53]; // 'P','R','F','S'

/// Header size in bytes
pub const HEADER_SIZE: usize = 20;

/// Maximum key size in bytes
pub const MAX_KEY_SIZE: usize = 256;

/// Maximum scalar payload size in bytes (caps string values)
pub const MAX_VALUE_SIZE: usize = 64 * 1024;

/// Journal operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordOp {
    /// Insert or update one preference entry
    Put = 1,
    /// Delete one preference entry
    Remove = 2,
    /// Delete every entry in the space
    RemoveAll = 3,
}

/// Fixed-size header for each journal record.
/// Size: 20 bytes
///
/// Layout:
///   [0..4]   magic:     [u8;4] - "PRFS"
///   [4..6]   key_len:   u16 LE
///   [6..10]  value_len: u32 LE
///   [10..14] checksum:  u32 LE - CRC32C of (key_bytes + value_bytes)
///   [14]     op:        u8     - Put=1, Remove=2, RemoveAll=3
///   [15]     kind:      u8     - scalar kind tag, 0 when no payload
///   [16..20] reserved:  [u8;4] - must be zero
#[derive(Debug, Clone, Copy)]
struct RecordHeader {
    magic: [u8; 4],
    key_len: u16,
    value_len: u32,
    checksum: u32,
    op: u8,
    kind: u8,
}

impl RecordHeader {
    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..6].copy_from_slice(&self.key_len.to_le_bytes());
        buf[6..10].copy_from_slice(&self.value_len.to_le_bytes());
        buf[10..14].copy_from_slice(&self.checksum.to_le_bytes());
        buf[14] = self.op;
        buf[15] = self.kind;
        // bytes 16..20 are reserved, already zero
        buf
    }

    fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        Self {
            magic,
            key_len: u16::from_le_bytes([buf[4], buf[5]]),
            value_len: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
            checksum: u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]),
            op: buf[14],
            kind: buf[15],
        }
    }
}

/// A record decoded from the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    pub op: RecordOp,
    pub key: String,
    pub value: Option<Scalar>,
}

fn kind_tag(kind: ScalarKind) -> u8 {
    match kind {
        ScalarKind::Boolean => 1,
        ScalarKind::Float => 2,
        ScalarKind::Int => 3,
        ScalarKind::Long => 4,
        ScalarKind::String => 5,
    }
}

fn kind_from_tag(tag: u8) -> Option<ScalarKind> {
    match tag {
        1 => Some(ScalarKind::Boolean),
        2 => Some(ScalarKind::Float),
        3 => Some(ScalarKind::Int),
        4 => Some(ScalarKind::Long),
        5 => Some(ScalarKind::String),
        _ => None,
    }
}

fn encode_scalar(value: &Scalar) -> Vec<u8> {
    match value {
        Scalar::Boolean(v) => vec![*v as u8],
        Scalar::Float(v) => v.to_le_bytes().to_vec(),
        Scalar::Int(v) => v.to_le_bytes().to_vec(),
        Scalar::Long(v) => v.to_le_bytes().to_vec(),
        Scalar::String(v) => v.as_bytes().to_vec(),
    }
}

fn decode_scalar(kind: ScalarKind, bytes: &[u8]) -> Option<Scalar> {
    match kind {
        ScalarKind::Boolean => match bytes {
            [0] => Some(Scalar::Boolean(false)),
            [1] => Some(Scalar::Boolean(true)),
            _ => None,
        },
        ScalarKind::Float => {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(Scalar::Float(f32::from_le_bytes(arr)))
        }
        ScalarKind::Int => {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(Scalar::Int(i32::from_le_bytes(arr)))
        }
        ScalarKind::Long => {
            let arr: [u8; 8] = bytes.try_into().ok()?;
            Some(Scalar::Long(i64::from_le_bytes(arr)))
        }
        ScalarKind::String => std::str::from_utf8(bytes)
            .ok()
            .map(|s| Scalar::String(s.to_string())),
    }
}

fn record_error(offset: u64, reason: String) -> PrefError {
    PrefError::Corrupted {
        path: std::path::PathBuf::from("<record>"),
        offset,
        reason,
    }
}

/// Serialize a journal record into its on-disk form.
///
/// `value` must be `Some` for Put and `None` for Remove/RemoveAll.
pub fn serialize_record(op: RecordOp, key: &str, value: Option<&Scalar>) -> PrefResult<Vec<u8>> {
    // Validate input sizes BEFORE any allocation
    if key.len() > MAX_KEY_SIZE {
        return Err(PrefError::Oversized {
            size: key.len() as u64,
            max: MAX_KEY_SIZE as u64,
            component: "key".to_string(),
        });
    }

    let payload = value.map(encode_scalar).unwrap_or_default();
    if payload.len() > MAX_VALUE_SIZE {
        return Err(PrefError::Oversized {
            size: payload.len() as u64,
            max: MAX_VALUE_SIZE as u64,
            component: "value".to_string(),
        });
    }

    // CRC32C over key bytes + payload bytes
    let mut checked = Vec::with_capacity(key.len() + payload.len());
    checked.extend_from_slice(key.as_bytes());
    checked.extend_from_slice(&payload);
    let checksum = crc32c::crc32c(&checked);

    let header = RecordHeader {
        magic: MAGIC_ARRAY,
        key_len: key.len() as u16,
        value_len: payload.len() as u32,
        checksum,
        op: op as u8,
        kind: value.map(|v| kind_tag(v.kind())).unwrap_or(0),
    };

    let mut buffer = Vec::with_capacity(HEADER_SIZE + checked.len());
    buffer.extend_from_slice(&header.to_bytes());
    buffer.extend_from_slice(&checked);
    Ok(buffer)
}

/// Total on-disk size of the record starting at `data[0]`, if the header
/// is complete. Used by replay to know how far to advance.
pub fn record_len(data: &[u8]) -> Option<usize> {
    if data.len() < HEADER_SIZE {
        return None;
    }
    let header_bytes: [u8; HEADER_SIZE] = data[..HEADER_SIZE].try_into().ok()?;
    let header = RecordHeader::from_bytes(&header_bytes);
    Some(HEADER_SIZE + header.key_len as usize + header.value_len as usize)
}

/// Deserialize one complete record from the front of `data`.
///
/// `offset` is the record's position in the journal, used only for error
/// context.
pub fn deserialize_record(data: &[u8], offset: u64) -> PrefResult<JournalRecord> {
    if data.len() < HEADER_SIZE {
        return Err(record_error(
            offset,
            format!("record too short: {} bytes, need at least {}", data.len(), HEADER_SIZE),
        ));
    }

    let header_bytes: [u8; HEADER_SIZE] = data[..HEADER_SIZE]
        .try_into()
        .expect("slice length checked above");
    let header = RecordHeader::from_bytes(&header_bytes);

    if header.magic != MAGIC_ARRAY {
        return Err(record_error(offset, "bad magic bytes".to_string()));
    }
    if header.key_len as usize > MAX_KEY_SIZE {
        return Err(record_error(
            offset,
            format!("key_len {} exceeds MAX_KEY_SIZE {}", header.key_len, MAX_KEY_SIZE),
        ));
    }
    if header.value_len as usize > MAX_VALUE_SIZE {
        return Err(record_error(
            offset,
            format!("value_len {} exceeds MAX_VALUE_SIZE {}", header.value_len, MAX_VALUE_SIZE),
        ));
    }

    let key_end = HEADER_SIZE + header.key_len as usize;
    let value_end = key_end + header.value_len as usize;
    if data.len() < value_end {
        return Err(record_error(
            offset,
            format!("record truncated: need {} bytes, have {}", value_end, data.len()),
        ));
    }

    // Verify CRC32C over key + payload
    let computed = crc32c::crc32c(&data[HEADER_SIZE..value_end]);
    if computed != header.checksum {
        return Err(PrefError::ChecksumMismatch {
            path: std::path::PathBuf::from("<record>"),
            expected: header.checksum,
            actual: computed,
            offset,
        });
    }

    let op = match header.op {
        1 => RecordOp::Put,
        2 => RecordOp::Remove,
        3 => RecordOp::RemoveAll,
        other => return Err(record_error(offset, format!("invalid op type: {}", other))),
    };

    let key = std::str::from_utf8(&data[HEADER_SIZE..key_end])
        .map_err(|_| record_error(offset, "key is not valid UTF-8".to_string()))?
        .to_string();

    let value = match op {
        RecordOp::Put => {
            let kind = kind_from_tag(header.kind)
                .ok_or_else(|| record_error(offset, format!("invalid kind tag: {}", header.kind)))?;
            let scalar = decode_scalar(kind, &data[key_end..value_end])
                .ok_or_else(|| record_error(offset, format!("malformed {} payload", kind)))?;
            Some(scalar)
        }
        RecordOp::Remove | RecordOp::RemoveAll => None,
    };

    Ok(JournalRecord { op, key, value })
}
