// Zobrist hashing with precomputed key tables
//
// Keys are drawn from a seeded splitmix64 stream so hashes are stable across
// runs. The piece dimension is indexed by the 4-bit piece encoding (kind in
// the low 3 bits, color in bit 3) and carries a stack-layer axis: the same
// piece hashes differently on the bottom or the top of a stack.

use crate::board::Board;
use std::sync::OnceLock;

pub struct ZobristKeys {
    /// piece[piece_index][stack_layer][square]
    pub piece: [[[u64; 64]; 2]; 15],
    pub turn: u64,
    pub castling: [u64; 16],
    pub ep_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

const SEED: u64 = 0x4b6c_696b_7363_6861; // "Klikscha"

fn split_mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn build_keys() -> ZobristKeys {
    let mut state = SEED;
    let mut next = || {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        split_mix64(state)
    };

    let mut piece = [[[0u64; 64]; 2]; 15];
    for keys in piece.iter_mut() {
        for layer in keys.iter_mut() {
            for key in layer.iter_mut() {
                *key = next();
            }
        }
    }

    let turn = next();

    let mut castling = [0u64; 16];
    for key in castling.iter_mut() {
        *key = next();
    }

    let mut ep_file = [0u64; 8];
    for key in ep_file.iter_mut() {
        *key = next();
    }

    ZobristKeys {
        piece,
        turn,
        castling,
        ep_file,
    }
}

#[inline(always)]
pub fn init_zobrist() {
    KEYS.get_or_init(build_keys);
}

#[inline]
pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build_keys)
}

/// Full hash of a position. Stack layer 0 is the bottom piece.
pub fn compute(board: &Board) -> u64 {
    let keys = keys();
    let mut h = 0u64;

    for sq in 0..64u8 {
        for (layer, piece) in board.stack_at(sq).iter().enumerate() {
            h ^= keys.piece[piece.index()][layer][sq as usize];
        }
    }

    if board.side_to_move == crate::board::Color::Black {
        h ^= keys.turn;
    }

    h ^= keys.castling[board.castling as usize];

    if let Some(ep) = board.ep_square {
        h ^= keys.ep_file[(ep & 7) as usize];
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, START_FEN};

    #[test]
    fn test_keys_are_stable() {
        let a = keys().piece[1][0][0];
        let b = keys().piece[1][0][0];
        assert_eq!(a, b);
        assert_ne!(keys().piece[1][0][0], keys().piece[1][1][0]);
    }

    #[test]
    fn test_stack_order_changes_hash() {
        crate::init();
        let mut a = Board::new();
        a.set_from_fen("4k3/8/8/8/4(NP)3/8/8/4K3 w - - 0 1").unwrap();
        let mut b = Board::new();
        b.set_from_fen("4k3/8/8/8/4(PN)3/8/8/4K3 w - - 0 1").unwrap();
        assert_ne!(compute(&a), compute(&b));
    }

    #[test]
    fn test_equal_boards_equal_hash() {
        crate::init();
        let mut a = Board::new();
        a.set_from_fen(START_FEN).unwrap();
        let mut b = Board::new();
        b.set_from_fen(START_FEN).unwrap();
        assert_eq!(compute(&a), compute(&b));
        assert_eq!(a.zobrist, b.zobrist);
    }
}
