//! Perft self-consistency over the variant move generator. There is no
//! external reference engine for Klikschaak, so the shallow counts are
//! hand-verified and the deeper walks assert stability and that the
//! traversal leaves the board bit-exact.

use klikschaak::board::{Board, START_FEN};

fn perft(board: &mut Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for mv in board.generate_moves() {
        let undo = board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(undo);
    }
    nodes
}

#[test]
fn perft_startpos_shallow() {
    klikschaak::init();
    let mut board = Board::from_fen(START_FEN).unwrap();

    assert_eq!(perft(&mut board, 1), 34);
    // No first move by White checks Black or blocks any Black option,
    // so depth 2 is exactly 34 * 34
    assert_eq!(perft(&mut board, 2), 1156);
}

#[test]
fn perft_is_deterministic_and_leaves_the_board_intact() {
    let mut board = Board::from_fen(START_FEN).unwrap();
    let before = board.clone();

    let first = perft(&mut board, 3);
    assert_eq!(board, before, "perft(3) must restore the board");

    let second = perft(&mut board, 3);
    assert_eq!(first, second, "perft(3) must be deterministic");
    assert_eq!(board, before);
    assert_eq!(board.zobrist, before.zobrist);
}

#[test]
fn perft_counts_known_small_positions() {
    // Ke1 + Pe2 + Ne4 vs Ke8: 4 king steps, e3 push, e4 forward klik,
    // 8 knight moves
    let mut board = Board::from_fen("4k3/8/8/8/4N3/8/4P3/4K3 w - - 0 1").unwrap();
    assert_eq!(perft(&mut board, 1), 14);

    // Lone kings: 5 steps each side
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(perft(&mut board, 1), 5);
    assert_eq!(perft(&mut board, 2), 25);
}

#[test]
fn perft_stacked_position_is_stable() {
    let mut board = Board::from_fen("4k3/8/8/3p(NP)3/8/8/8/4K3 w - d6 0 1").unwrap();
    let before = board.clone();
    let a = perft(&mut board, 3);
    let b = perft(&mut board, 3);
    assert_eq!(a, b);
    assert_eq!(board, before);
}
