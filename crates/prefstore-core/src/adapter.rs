//! The narrow interface every platform backing implements
//!
//! A [`PrefStore`](crate::PrefStore) and its editors are built purely in
//! terms of this trait; the core defines no wire format, file format, or
//! durability policy of its own.

use crate::error::PrefResult;
use crate::value::{Scalar, ScalarKind};

/// Storage backing for one preference space.
///
/// All methods take `&self`: implementations use interior mutability so a
/// single adapter can be shared between Store handles and Editors through
/// `Arc<dyn StorageAdapter>`.
///
/// Reads are infallible by contract — a key that is absent, or whose stored
/// representation does not match the requested kind, reads as `None` and the
/// caller falls back to its default value. Only mutations can fail (disk,
/// quota, platform API), and those failures surface at
/// [`PrefEditor::apply`](crate::PrefEditor::apply).
pub trait StorageAdapter: Send + Sync {
    /// True iff an entry for `key` currently exists, of any kind.
    fn contains(&self, key: &str) -> bool;

    /// Read the value for `key` as the requested kind.
    ///
    /// Absent key and kind mismatch both return `None`. String-typed
    /// backings may coerce, falling back to `None` on coercion failure.
    fn read(&self, key: &str, kind: ScalarKind) -> Option<Scalar>;

    /// Insert or overwrite the entry for `key`.
    fn write(&self, key: &str, value: Scalar) -> PrefResult<()>;

    /// Delete the entry for `key`. Deleting an absent key is a no-op.
    fn remove(&self, key: &str) -> PrefResult<()>;

    /// Delete every entry in this space.
    fn remove_all(&self) -> PrefResult<()>;
}
