// Square helpers and precomputed target tables for move generation

use arrayvec::ArrayVec;
use std::sync::OnceLock;

// Direction deltas on the 0..64 square grid (a1 = 0, h8 = 63)
pub const NORTH: i8 = 8;
pub const SOUTH: i8 = -8;
pub const EAST: i8 = 1;
pub const WEST: i8 = -1;
pub const NORTH_EAST: i8 = 9;
pub const NORTH_WEST: i8 = 7;
pub const SOUTH_EAST: i8 = -7;
pub const SOUTH_WEST: i8 = -9;

pub const BISHOP_DIRECTIONS: [i8; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];
pub const ROOK_DIRECTIONS: [i8; 4] = [NORTH, SOUTH, EAST, WEST];
pub const QUEEN_DIRECTIONS: [i8; 8] = [
    NORTH, SOUTH, EAST, WEST, NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST,
];

#[inline]
pub fn square_file(sq: u8) -> u8 {
    sq & 7
}

#[inline]
pub fn square_rank(sq: u8) -> u8 {
    sq >> 3
}

#[inline]
pub fn make_square(file: u8, rank: u8) -> u8 {
    rank * 8 + file
}

/// Algebraic name of a square ("e4")
pub fn square_name(sq: u8) -> String {
    let mut s = String::with_capacity(2);
    s.push((b'a' + square_file(sq)) as char);
    s.push((b'1' + square_rank(sq)) as char);
    s
}

/// Parse algebraic notation; None for anything that is not a board square
pub fn parse_square(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file < 8 && rank < 8 {
        Some(make_square(file, rank))
    } else {
        None
    }
}

// Bit iteration over target-set masks
#[inline]
pub fn pop_lsb(bb: &mut u64) -> Option<u8> {
    if *bb == 0 {
        return None;
    }
    let lsb = bb.trailing_zeros() as u8;
    *bb &= *bb - 1;
    Some(lsb)
}

// Precomputed knight and king target lists, built once behind OnceLock
pub type TargetList = ArrayVec<u8, 8>;

static KNIGHT_TARGETS: OnceLock<[TargetList; 64]> = OnceLock::new();
static KING_TARGETS: OnceLock<[TargetList; 64]> = OnceLock::new();

fn build_targets(offsets: &[(i8, i8)]) -> [TargetList; 64] {
    std::array::from_fn(|sq| {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut targets = TargetList::new();
        for &(df, dr) in offsets {
            let nf = file + df;
            let nr = rank + dr;
            if (0..8).contains(&nf) && (0..8).contains(&nr) {
                targets.push((nr * 8 + nf) as u8);
            }
        }
        targets
    })
}

fn build_knight_targets() -> [TargetList; 64] {
    const OFFSETS: [(i8, i8); 8] = [
        (-2, -1),
        (-2, 1),
        (-1, -2),
        (-1, 2),
        (1, -2),
        (1, 2),
        (2, -1),
        (2, 1),
    ];
    build_targets(&OFFSETS)
}

fn build_king_targets() -> [TargetList; 64] {
    const OFFSETS: [(i8, i8); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
    build_targets(&OFFSETS)
}

#[inline(always)]
pub fn init_move_tables() {
    KNIGHT_TARGETS.get_or_init(build_knight_targets);
    KING_TARGETS.get_or_init(build_king_targets);
}

#[inline]
pub fn knight_targets(sq: u8) -> &'static [u8] {
    let table = KNIGHT_TARGETS.get_or_init(build_knight_targets);
    &table[sq as usize]
}

#[inline]
pub fn king_targets(sq: u8) -> &'static [u8] {
    let table = KING_TARGETS.get_or_init(build_king_targets);
    &table[sq as usize]
}
