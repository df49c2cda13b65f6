//! Klikschaak engine core.
//!
//! Klikschaak is a chess variant where up to two same-color pieces may
//! share a square as a stack, which adds klik, unklik, combined and
//! klik-castling moves. This crate provides the stacked board with
//! extended FEN, legal move generation, reversible make/unmake, a static
//! evaluator and an iterative-deepening alpha-beta search.

pub mod api;
pub mod board;
pub mod eval;
pub mod movegen;
pub mod search;
pub mod utils;
pub mod zobrist;

pub use board::{
    Board, Color, FenError, Move, MoveKind, Piece, PieceKind, SquareStack, Undo, START_FEN,
};
pub use search::{Search, SearchInfo, SearchParams};

/// Force one-time initialization of the move tables and Zobrist keys.
/// Safe to call more than once.
pub fn init() {
    utils::init_move_tables();
    zobrist::init_zobrist();
}
