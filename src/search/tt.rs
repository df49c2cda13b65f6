//! Transposition table
//!
//! Fixed-size direct-mapped table with trivial always-replace insertion.
//! The search is single-threaded, so entries are plain values; collisions
//! are rejected by a full 64-bit key compare on probe.

use crate::board::Move;

/// Node type for transposition table entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    /// Fail-low: score is an upper bound (alpha flag)
    UpperBound,
    /// Fail-high: score is a lower bound (beta flag)
    LowerBound,
}

/// Single TT entry
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub node_type: NodeType,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table with at least `capacity` slots, rounded up to a
    /// power of two for mask indexing
    pub fn new(capacity: usize) -> Self {
        let slots = capacity.next_power_of_two().max(1024);
        Self {
            entries: vec![None; slots],
            mask: slots - 1,
        }
    }

    /// Probe by full key; a slot holding a different position returns None
    pub fn probe(&self, key: u64) -> Option<&TTEntry> {
        let entry = self.entries[key as usize & self.mask].as_ref()?;
        if entry.key == key {
            Some(entry)
        } else {
            None
        }
    }

    /// Bounded insert: the slot for this key is always overwritten
    pub fn store(&mut self, key: u64, depth: u8, score: i32, node_type: NodeType, best_move: Option<Move>) {
        self.entries[key as usize & self.mask] = Some(TTEntry {
            key,
            depth,
            score,
            node_type,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn fill_percentage(&self) -> f64 {
        self.occupied() as f64 / self.entries.len() as f64 * 100.0
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}
