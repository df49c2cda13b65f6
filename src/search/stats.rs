//! Search statistics and per-depth reports
//!
//! Tracks nodes searched, quiescence nodes, transposition table traffic,
//! cutoffs and timing. One `SearchInfo` is recorded after every completed
//! iterative-deepening depth.

use std::time::Instant;

use crate::board::Move;

/// Result of one completed iterative-deepening depth
#[derive(Debug, Clone, Default)]
pub struct SearchInfo {
    /// Completed depth in plies
    pub depth: u8,

    /// Score in centipawns from White's point of view
    pub score: i32,

    /// Principal variation, best move first
    pub pv: Vec<Move>,

    /// Nodes searched so far, cumulative over the deepening loop
    pub nodes: u64,

    /// Milliseconds elapsed since the search started
    pub time_ms: u64,

    /// Nodes per second
    pub nps: u64,
}

/// Running counters for one search call
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Total nodes searched
    pub nodes: u64,

    /// Quiescence nodes searched
    pub qsearch_nodes: u64,

    /// Transposition table hits
    pub tt_hits: u64,

    /// Alpha-beta cutoffs
    pub cutoffs: u64,

    /// One report per completed depth
    pub depth_reports: Vec<SearchInfo>,

    /// Search start time
    pub start_time: Option<Instant>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Milliseconds since start_timing
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Nodes per second over the elapsed time
    pub fn nps(&self) -> u64 {
        let ms = self.elapsed_ms();
        if ms > 0 {
            self.nodes * 1000 / ms
        } else {
            0
        }
    }

    #[inline]
    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    #[inline]
    pub fn inc_qsearch_node(&mut self) {
        self.qsearch_nodes += 1;
    }

    #[inline]
    pub fn inc_tt_hit(&mut self) {
        self.tt_hits += 1;
    }

    #[inline]
    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Print a short summary, UCI-info style, one line per depth
    pub fn print_summary(&self) {
        for info in &self.depth_reports {
            println!(
                "info depth {} score cp {} nodes {} nps {} time {} pv {}",
                info.depth,
                info.score,
                info.nodes,
                info.nps,
                info.time_ms,
                info.pv
                    .iter()
                    .map(|m| m.to_uci())
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
    }
}
