//! Configuration for the file-backed adapter
//!
//! Two write profiles: durable (sync every journal append) and batched
//! (leave flushing to the OS, or to an explicit `FileAdapter::sync()`).

/// File adapter configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Sync every journal append to persistent storage before returning.
    /// When false, appends land in the OS page cache; call
    /// `FileAdapter::sync()` to flush a batch in one go.
    pub durable_writes: bool,
    /// Compaction trigger: rewrite the journal at open when the dead-record
    /// ratio (records superseded by later puts, removes, or clears) exceeds
    /// this fraction
    pub compaction_trigger_ratio: f64,
}

impl Config {
    /// Durable profile: every committed write survives power loss.
    pub fn durable() -> Self {
        Self {
            durable_writes: true,
            compaction_trigger_ratio: 0.5,
        }
    }

    /// Batched profile: fast appends, durability at explicit sync points.
    pub fn batched() -> Self {
        Self {
            durable_writes: false,
            compaction_trigger_ratio: 0.5,
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.compaction_trigger_ratio <= 0.0 || self.compaction_trigger_ratio >= 1.0 {
            return Err("compaction_trigger_ratio must be in (0.0, 1.0)".into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::durable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        assert!(Config::durable().validate().is_ok());
        assert!(Config::batched().validate().is_ok());
    }

    #[test]
    fn test_default_is_durable() {
        assert!(Config::default().durable_writes);
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let mut config = Config::durable();
        config.compaction_trigger_ratio = 1.0;
        assert!(config.validate().is_err());
        config.compaction_trigger_ratio = 0.0;
        assert!(config.validate().is_err());
    }
}
