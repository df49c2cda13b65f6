//! Legality-filter equivalence: a move is legal iff it is pseudo-legal
//! and, once made, leaves our own king unattacked.

use klikschaak::board::{Board, START_FEN};

const POSITIONS: &[&str] = &[
    START_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    // Pinned stack on the e-file
    "4r1k1/8/8/8/4(NB)3/8/8/4K3 w - - 0 1",
    // In check: every legal move must resolve it
    "rnbqkbnr/pppp1ppp/8/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 3",
    "4k3/8/8/3p(NP)3/8/8/8/4K3 w - d6 0 1",
    "4k3/8/8/8/2(qr)5/8/8/4K3 b - - 0 1",
];

#[test]
fn legal_equals_pseudo_filtered_by_king_safety() {
    for fen in POSITIONS {
        let mut board = Board::from_fen(fen).unwrap();
        let us = board.side_to_move;

        let legal = board.generate_moves();
        let pseudo = board.generate_pseudo_moves();

        let mut filtered = Vec::new();
        for mv in pseudo {
            let undo = board.make_move(mv);
            if !board.is_in_check(us) {
                filtered.push(mv);
            }
            board.unmake_move(undo);
        }

        assert_eq!(legal, filtered, "legality mismatch for {fen}");
    }
}

#[test]
fn every_legal_move_resolves_check() {
    // Rook check down the e-file; king steps and a bishop block exist
    let mut board = Board::from_fen("4r3/8/8/8/8/8/3B4/4K2k w - - 0 1").unwrap();
    assert!(board.is_in_check(board.side_to_move));
    let us = board.side_to_move;

    let moves = board.generate_moves();
    assert!(!moves.is_empty());
    for mv in moves {
        let undo = board.make_move(mv);
        assert!(
            !board.is_in_check(us),
            "{} leaves the king in check",
            mv.to_uci()
        );
        board.unmake_move(undo);
    }
}

#[test]
fn legal_moves_are_a_subset_of_pseudo() {
    for fen in POSITIONS {
        let mut board = Board::from_fen(fen).unwrap();
        let pseudo = board.generate_pseudo_moves();
        for mv in board.generate_moves() {
            assert!(pseudo.contains(&mv), "{fen}: {} not pseudo-legal", mv.to_uci());
        }
    }
}
