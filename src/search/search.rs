//! Main search implementation
//!
//! Iterative deepening negamax alpha-beta with principal variation
//! tracking, transposition table, quiescence search, killer moves and a
//! history heuristic. The search owns its board and mutates it in place
//! through make/unmake.

use std::time::Instant;

use super::params::SearchParams;
use super::stats::{SearchInfo, SearchStats};
use super::tt::{NodeType, TranspositionTable};
use crate::board::{Board, Color, Move};
use crate::eval::{evaluate, piece_value, CHECKMATE_SCORE, DRAW_SCORE, PAWN_VALUE};

pub const MAX_DEPTH: u8 = 64;
pub const INFINITY: i32 = 1_000_000;

/// The soft time limit is checked once per this many nodes
const TIME_CHECK_INTERVAL: u64 = 4096;

pub struct Search {
    board: Board,

    tt: TranspositionTable,

    params: SearchParams,

    stats: SearchStats,

    /// Two killer slots per depth, no duplicates
    killers: [[Option<Move>; 2]; MAX_DEPTH as usize],

    /// History heuristic table [from][to]
    history: [[i32; 64]; 64],

    /// Cooperative stop flag, observed at the node-interval time check
    stop: bool,

    start_time: Instant,
    time_limit_ms: u64,
}

impl Search {
    pub fn new(board: Board, params: SearchParams) -> Self {
        crate::init();
        Self {
            tt: TranspositionTable::new(params.tt_entries),
            board,
            params,
            stats: SearchStats::new(),
            killers: [[None; 2]; MAX_DEPTH as usize],
            history: [[0; 64]; 64],
            stop: false,
            start_time: Instant::now(),
            time_limit_ms: 0,
        }
    }

    pub fn with_board(board: Board) -> Self {
        Self::new(board, SearchParams::default())
    }

    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Reset transposition table, killers and history between games
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers = [[None; 2]; MAX_DEPTH as usize];
        self.history = [[0; 64]; 64];
    }

    /// Iterative deepening from depth 1 up to `max_depth`.
    ///
    /// Returns the best move and the report of the last fully completed
    /// depth. A position without legal moves yields `None`; the caller
    /// distinguishes mate from stalemate with `is_in_check`. A timeout
    /// mid-depth keeps the result of the previous completed depth.
    pub fn search(&mut self, max_depth: Option<u8>) -> (Option<Move>, SearchInfo) {
        let max_depth = max_depth.unwrap_or(self.params.max_depth).min(MAX_DEPTH - 1);

        self.stats.reset();
        self.stats.start_timing();
        self.start_time = Instant::now();
        self.time_limit_ms = self.params.time_limit_ms;
        self.stop = false;

        let mut best_move = None;
        let mut last_info = SearchInfo::default();

        for depth in 1..=max_depth {
            if self.stop {
                break;
            }

            let (score, pv) = self.alpha_beta(depth, -INFINITY, INFINITY);
            if self.stop {
                break;
            }

            let info = SearchInfo {
                depth,
                // Punteggio riportato dal punto di vista del Bianco
                score: if self.board.side_to_move == Color::White {
                    score
                } else {
                    -score
                },
                pv: pv.clone(),
                nodes: self.stats.nodes,
                time_ms: self.stats.elapsed_ms(),
                nps: self.stats.nps(),
            };
            if let Some(&first) = pv.first() {
                best_move = Some(first);
            }
            last_info = info.clone();
            self.stats.depth_reports.push(info);
        }

        // Nessuna PV completata: ripiega sulla prima mossa legale
        if best_move.is_none() {
            best_move = self.board.generate_moves().into_iter().next();
        }

        (best_move, last_info)
    }

    /// Negamax alpha-beta with PV tracking. Pseudo-legal moves are made
    /// and rejected when they leave our king attacked.
    fn alpha_beta(&mut self, depth: u8, mut alpha: i32, beta: i32) -> (i32, Vec<Move>) {
        self.stats.inc_node();

        if self.stats.nodes % TIME_CHECK_INTERVAL == 0 && self.out_of_time() {
            self.stop = true;
            return (0, Vec::new());
        }
        if self.stop {
            return (0, Vec::new());
        }

        if depth == 0 {
            return (self.quiescence(alpha, beta, 0), Vec::new());
        }

        // Transposition table probe
        let key = self.board.zobrist;
        let mut tt_move = None;
        if let Some(&entry) = self.tt.probe(key) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                self.stats.inc_tt_hit();
                match entry.node_type {
                    NodeType::Exact => {
                        let pv = entry.best_move.map(|m| vec![m]).unwrap_or_default();
                        return (entry.score, pv);
                    }
                    NodeType::UpperBound if entry.score <= alpha => return (alpha, Vec::new()),
                    NodeType::LowerBound if entry.score >= beta => return (beta, Vec::new()),
                    _ => {}
                }
            }
        }

        let moves = self.board.generate_pseudo_moves();
        if moves.is_empty() {
            if self.board.is_in_check(self.board.side_to_move) {
                return (-CHECKMATE_SCORE + (MAX_DEPTH - depth) as i32, Vec::new());
            }
            return (DRAW_SCORE, Vec::new());
        }

        let moves = self.order_moves(moves, depth, tt_move);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut best_pv: Vec<Move> = Vec::new();
        let mut legal_count = 0u32;
        let us = self.board.side_to_move;

        for mv in moves {
            let undo = self.board.make_move(mv);
            if self.board.is_in_check(us) {
                self.board.unmake_move(undo);
                continue;
            }
            legal_count += 1;

            // Prima mossa a finestra piena, le altre a finestra nulla con
            // eventuale re-search
            let (score, child_pv) = if legal_count == 1 {
                let (s, pv) = self.alpha_beta(depth - 1, -beta, -alpha);
                (-s, pv)
            } else {
                let (s, _) = self.alpha_beta(depth - 1, -alpha - 1, -alpha);
                let s = -s;
                if alpha < s && s < beta {
                    let (s2, pv) = self.alpha_beta(depth - 1, -beta, -s);
                    (-s2, pv)
                } else {
                    (s, Vec::new())
                }
            };

            self.board.unmake_move(undo);

            if self.stop {
                return (0, Vec::new());
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                best_pv = Vec::with_capacity(child_pv.len() + 1);
                best_pv.push(mv);
                best_pv.extend(child_pv);
            }

            if score > alpha {
                alpha = score;
            }

            if alpha >= beta {
                self.stats.inc_cutoff();
                let slots = &mut self.killers[depth as usize];
                if slots[0] != Some(mv) && slots[1] != Some(mv) {
                    slots[1] = slots[0];
                    slots[0] = Some(mv);
                }
                self.history[mv.from as usize][mv.to as usize] += depth as i32 * depth as i32;
                break;
            }
        }

        if legal_count == 0 {
            if self.board.is_in_check(us) {
                // Mate più vicini valgono di più
                return (-CHECKMATE_SCORE + (MAX_DEPTH - depth) as i32, Vec::new());
            }
            return (DRAW_SCORE, Vec::new());
        }

        let node_type = if best_score <= original_alpha {
            NodeType::UpperBound
        } else if best_score >= beta {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        };
        self.tt.store(key, depth, best_score, node_type, best_move);

        (best_score, best_pv)
    }

    /// Quiescence search over captures only, MVV-LVA ordered, with a hard
    /// ply cap beyond the main horizon.
    fn quiescence(&mut self, mut alpha: i32, beta: i32, qdepth: u8) -> i32 {
        self.stats.inc_node();
        self.stats.inc_qsearch_node();

        let mut stand_pat = evaluate(&self.board);
        if self.board.side_to_move == Color::Black {
            stand_pat = -stand_pat;
        }

        if stand_pat >= beta {
            return beta;
        }
        if alpha < stand_pat {
            alpha = stand_pat;
        }
        if qdepth >= self.params.qsearch_depth {
            return alpha;
        }

        let mut captures = self.board.generate_captures();
        captures.sort_by_key(|&mv| std::cmp::Reverse(self.mvv_lva_score(mv)));

        let us = self.board.side_to_move;
        for mv in captures {
            let undo = self.board.make_move(mv);
            if self.board.is_in_check(us) {
                self.board.unmake_move(undo);
                continue;
            }
            let score = -self.quiescence(-beta, -alpha, qdepth + 1);
            self.board.unmake_move(undo);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    // Move ordering -----------------------------------------------

    /// A move captures when its kind says so or when the destination holds
    /// an enemy piece (unklik captures carry the plain Unklik kind).
    fn is_capture(&self, mv: Move) -> bool {
        if mv.kind.is_capture() {
            return true;
        }
        self.board
            .stack_at(mv.to)
            .top()
            .is_some_and(|p| p.color != self.board.side_to_move)
    }

    /// Most Valuable Victim / Least Valuable Attacker. The victim value of
    /// a stacked destination counts every enemy piece on it.
    fn mvv_lva_score(&self, mv: Move) -> i32 {
        let target = self.board.stack_at(mv.to);
        let victim_value: i32 = if target.is_empty() {
            PAWN_VALUE // en passant
        } else {
            target
                .iter()
                .filter(|p| p.color != self.board.side_to_move)
                .map(|p| piece_value(p.kind))
                .sum()
        };

        let origin = self.board.stack_at(mv.from);
        let attacker = if mv.unklik_index >= 0 && (mv.unklik_index as usize) < origin.count() {
            origin.get(mv.unklik_index as usize)
        } else {
            origin.top()
        };
        let attacker_value = attacker.map_or(0, |p| piece_value(p.kind));

        victim_value * 10 - attacker_value
    }

    /// Priority: TT move, captures by MVV-LVA, killers, history
    fn order_moves(&self, moves: Vec<Move>, depth: u8, tt_move: Option<Move>) -> Vec<Move> {
        let killers = self.killers[depth as usize];
        let mut scored: Vec<(i32, Move)> = moves
            .into_iter()
            .map(|mv| {
                let score = if tt_move == Some(mv) {
                    10_000_000
                } else if self.is_capture(mv) {
                    1_000_000 + self.mvv_lva_score(mv)
                } else if killers[0] == Some(mv) {
                    900_000
                } else if killers[1] == Some(mv) {
                    800_000
                } else {
                    self.history[mv.from as usize][mv.to as usize]
                };
                (score, mv)
            })
            .collect();
        scored.sort_by_key(|&(score, _)| std::cmp::Reverse(score));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    fn out_of_time(&self) -> bool {
        self.time_limit_ms > 0
            && self.start_time.elapsed().as_millis() as u64 >= self.time_limit_ms
    }
}
