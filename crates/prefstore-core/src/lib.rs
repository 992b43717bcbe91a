//! prefstore-core — typed preference storage with batched editors
//!
//! A uniform API for reading and writing scalar settings (boolean, float,
//! int, long, string), backed by a pluggable storage adapter per platform.
//!
//! # Architecture
//!
//! - **Read path**: [`PrefStore`] serves typed reads with default fallback,
//!   straight from the backing adapter
//! - **Write path**: [`PrefEditor`] stages put/remove/clear operations and
//!   flushes them atomically on [`apply()`](PrefEditor::apply)
//! - **Spaces**: [`SpaceRegistry`] resolves a named preference space to its
//!   adapter; handles for the same space share the same data
//!
//! # Pluggable backings
//!
//! The core has no wire format and no platform assumptions of its own.
//! Everything durable lives behind the [`StorageAdapter`] trait; durable
//! adapters live in separate crates (e.g. prefstore-file).

pub mod adapter;
pub mod editor;
pub mod error;
pub mod memory;
pub mod registry;
pub mod store;
pub mod value;

// Re-export key types for convenience
pub use adapter::StorageAdapter;
pub use editor::PrefEditor;
pub use error::{PrefError, PrefResult};
pub use memory::{MemoryAdapter, StringMemoryAdapter};
pub use registry::{global, install_global, SpaceRegistry, DEFAULT_SPACE};
pub use store::PrefStore;
pub use value::{Scalar, ScalarKind};
