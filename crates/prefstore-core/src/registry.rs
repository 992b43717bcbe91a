//! Space resolution — from a namespace name to a live store handle
//!
//! A [`SpaceRegistry`] owns an injected adapter factory and hands out
//! [`PrefStore`] handles per space name. Opening the same space twice
//! yields handles over one shared adapter, so every handle observes the
//! same data.
//!
//! For callers that want the ergonomics of a process-wide entry point,
//! a single global registry can be installed once; resolution before
//! installation is a typed precondition error, not a panic.

use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::adapter::StorageAdapter;
use crate::error::{PrefError, PrefResult};
use crate::store::PrefStore;

/// Name of the process-level default space.
pub const DEFAULT_SPACE: &str = "default";

/// Builds the adapter for a space the first time that space is opened.
pub type AdapterFactory =
    Box<dyn Fn(&str) -> PrefResult<Arc<dyn StorageAdapter>> + Send + Sync>;

/// Resolves space names to backing adapters, caching one adapter per space.
pub struct SpaceRegistry {
    factory: AdapterFactory,
    spaces: Mutex<HashMap<String, Arc<dyn StorageAdapter>>>,
}

impl SpaceRegistry {
    /// Create a registry around an adapter factory.
    ///
    /// The factory runs once per space name; its result is cached for the
    /// lifetime of the registry.
    pub fn new(factory: AdapterFactory) -> Self {
        Self {
            factory,
            spaces: Mutex::new(HashMap::new()),
        }
    }

    /// Open (or create on first access) the named space.
    pub fn open(&self, space: &str) -> PrefResult<PrefStore> {
        let mut spaces = self.spaces.lock();
        let adapter = match spaces.get(space) {
            Some(adapter) => Arc::clone(adapter),
            None => {
                let adapter = (self.factory)(space)?;
                spaces.insert(space.to_string(), Arc::clone(&adapter));
                adapter
            }
        };
        Ok(PrefStore::new(adapter))
    }

    /// Open the process-level default space.
    pub fn open_default(&self) -> PrefResult<PrefStore> {
        self.open(DEFAULT_SPACE)
    }

    /// Number of spaces opened so far.
    pub fn space_count(&self) -> usize {
        self.spaces.lock().len()
    }
}

impl std::fmt::Debug for SpaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceRegistry")
            .field("spaces", &self.space_count())
            .finish()
    }
}

static GLOBAL: OnceLock<SpaceRegistry> = OnceLock::new();

/// Install the process-wide registry.
///
/// Idempotent and thread-safe: the first install wins and returns `true`;
/// later calls leave the installed registry untouched and return `false`.
pub fn install_global(registry: SpaceRegistry) -> bool {
    GLOBAL.set(registry).is_ok()
}

/// The process-wide registry, if one was installed.
///
/// Returns [`PrefError::Precondition`] when no registry has been installed
/// yet — resolution never panics on a missing handle.
pub fn global() -> PrefResult<&'static SpaceRegistry> {
    GLOBAL.get().ok_or_else(|| PrefError::Precondition {
        message: "no process-wide space registry installed; call install_global() first"
            .to_string(),
    })
}
