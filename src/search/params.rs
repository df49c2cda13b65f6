//! Search parameters and configuration
//!
//! Controls search behavior: depth and soft time limits, quiescence depth
//! and transposition table sizing.

/// Search parameters for the engine
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Maximum search depth in plies
    pub max_depth: u8,

    /// Soft time limit in milliseconds (0 = unlimited), checked between
    /// nodes at a fixed node interval
    pub time_limit_ms: u64,

    /// Maximum quiescence depth beyond the main search horizon
    pub qsearch_depth: u8,

    /// Transposition table capacity in entries (rounded up to a power of two)
    pub tt_entries: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            time_limit_ms: 0,
            qsearch_depth: 10,
            tt_entries: 1_000_000,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum depth in plies
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the soft time limit in milliseconds
    pub fn time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Set quiescence search depth cap
    pub fn qsearch_depth(mut self, depth: u8) -> Self {
        self.qsearch_depth = depth;
        self
    }

    /// Set transposition table capacity in entries
    pub fn tt_entries(mut self, entries: usize) -> Self {
        self.tt_entries = entries;
        self
    }
}
