//! Write-side staging and batch commit
//!
//! A [`PrefEditor`] accumulates pending mutations and flushes them to the
//! backing adapter as one batch on [`apply()`](PrefEditor::apply). Nothing
//! reaches the store until then.
//!
//! COMMIT ORDERING (the contract callers rely on):
//!
//! 1. If `clear()` was staged — in any position — the space is wiped first.
//! 2. Staged puts and removes replay in their original call order.
//! 3. Only after every step succeeds is the pending batch reset.
//!
//! Clear precedence is structural here: `clear` is a flag, not a queue
//! entry, so `put(k, v); clear(); apply()` leaves `k = v` in the store.

use std::sync::Arc;

use crate::adapter::StorageAdapter;
use crate::error::PrefResult;
use crate::value::Scalar;

/// A staged mutation, replayed at commit in call order.
#[derive(Debug, Clone, PartialEq)]
enum PendingOp {
    Put(String, Scalar),
    Remove(String),
}

/// Batched editor for one preference space.
///
/// Staging calls record an operation and return immediately; they never
/// block and never fail. All adapter I/O happens inside `apply()`.
///
/// An editor is single-writer. It may be reused indefinitely: a successful
/// `apply()` resets it to an empty batch, and staged operations are never
/// replayed by a later `apply()`.
pub struct PrefEditor {
    adapter: Arc<dyn StorageAdapter>,
    pending: Vec<PendingOp>,
    clear_all: bool,
}

impl PrefEditor {
    pub(crate) fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self {
            adapter,
            pending: Vec::new(),
            clear_all: false,
        }
    }

    /// Stage a boolean value for `key`, written back once `apply()` is called.
    pub fn put_boolean(&mut self, key: &str, value: bool) -> &mut Self {
        self.put(key, Scalar::Boolean(value))
    }

    /// Stage a float value for `key`, written back once `apply()` is called.
    pub fn put_float(&mut self, key: &str, value: f32) -> &mut Self {
        self.put(key, Scalar::Float(value))
    }

    /// Stage an int value for `key`, written back once `apply()` is called.
    pub fn put_int(&mut self, key: &str, value: i32) -> &mut Self {
        self.put(key, Scalar::Int(value))
    }

    /// Stage a long value for `key`, written back once `apply()` is called.
    pub fn put_long(&mut self, key: &str, value: i64) -> &mut Self {
        self.put(key, Scalar::Long(value))
    }

    /// Stage a string value for `key`, written back once `apply()` is called.
    pub fn put_string(&mut self, key: &str, value: &str) -> &mut Self {
        self.put(key, Scalar::String(value.to_string()))
    }

    /// Stage any scalar value for `key`.
    ///
    /// Within one batch the last staged write for a key wins, whether the
    /// earlier operation was a put or a remove.
    pub fn put(&mut self, key: &str, value: Scalar) -> &mut Self {
        self.pending.push(PendingOp::Put(key.to_string(), value));
        self
    }

    /// Stage deletion of `key`, applied once `apply()` is called.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.pending.push(PendingOp::Remove(key.to_string()));
        self
    }

    /// Stage deletion of every entry currently in the space.
    ///
    /// When committing, the clear runs first regardless of whether it was
    /// staged before or after the put calls on this editor — the only
    /// entries left afterwards are the ones this same batch put back.
    pub fn clear(&mut self) -> &mut Self {
        self.clear_all = true;
        self
    }

    /// Number of staged put/remove operations (not counting a staged clear).
    pub fn pending_ops(&self) -> usize {
        self.pending.len()
    }

    /// Commit the staged batch to the backing store.
    ///
    /// On success the editor resets to an empty batch. On failure the whole
    /// staged batch — including a staged clear — is preserved, so the caller
    /// may retry `apply()` after the adapter recovers.
    pub fn apply(&mut self) -> PrefResult<()> {
        if self.clear_all {
            self.adapter.remove_all()?;
        }

        for op in &self.pending {
            match op {
                PendingOp::Put(key, value) => self.adapter.write(key, value.clone())?,
                PendingOp::Remove(key) => self.adapter.remove(key)?,
            }
        }

        self.pending.clear();
        self.clear_all = false;
        Ok(())
    }
}

impl std::fmt::Debug for PrefEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefEditor")
            .field("pending", &self.pending.len())
            .field("clear_all", &self.clear_all)
            .finish()
    }
}
