/// Configuration for the history system.

/// Maximum number of edit groups kept per session.
/// Oldest groups are evicted when this limit is exceeded.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Time window in milliseconds for grouping consecutive edits
/// into a single undo step.
const DEFAULT_GROUP_TIMEOUT_MS: u64 = 500;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max edit groups kept in memory.
    pub max_history_depth: usize,
    /// Grouping timeout in milliseconds.
    pub group_timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
            group_timeout_ms: DEFAULT_GROUP_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_history_depth, 10_000);
        assert_eq!(config.group_timeout_ms, 500);
    }
}
