//! Extended-FEN round trips, including `(XY)` stack groups, and parse
//! error surfacing.

use klikschaak::board::{Board, FenError, START_FEN};

#[test]
fn canonical_fens_round_trip() {
    let fens = [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "4k3/8/8/8/4(NP)3/8/8/4K3 w - - 0 1",
        "4k3/8/8/3p(NP)3/8/8/8/4K3 w - d6 0 1",
        "4k3/8/8/8/2(qr)5/8/8/4K3 b - - 3 21",
        "4k3/8/8/8/8/8/8/4K2(RB) w K - 0 1",
        "8/4(NP)3/8/8/8/8/8/4K2k w - - 0 1",
        "8/8/8/8/(PP)7/8/8/4K2k w - - 99 120",
    ];
    for fen in fens {
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.to_fen(), *fen, "emit differs from canonical input");

        let reparsed = Board::from_fen(&board.to_fen()).unwrap();
        assert_eq!(reparsed, board, "parse(write(B)) != B for {fen}");
        assert_eq!(reparsed.zobrist, board.zobrist);
    }
}

#[test]
fn state_fields_survive_the_trip() {
    let board = Board::from_fen("4k3/8/8/3p(NP)3/8/8/8/4K3 w - d6 7 42").unwrap();
    assert_eq!(board.ep_square, Some(43)); // d6
    assert_eq!(board.halfmove_clock, 7);
    assert_eq!(board.fullmove, 42);

    let again = Board::from_fen(&board.to_fen()).unwrap();
    assert_eq!(again.ep_square, Some(43));
    assert_eq!(again.halfmove_clock, 7);
    assert_eq!(again.fullmove, 42);
}

#[test]
fn unmoved_pawn_mask_is_rebuilt_from_the_start_rank() {
    // e-pawn already advanced: its file bit must be clear
    let board =
        Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_eq!(board.unmoved_pawns[0], 0xFF & !(1 << 4));
    assert_eq!(board.unmoved_pawns[1], 0xFF);

    // A pawn inside a stack on the start rank still counts as unmoved
    let board = Board::from_fen("4k3/8/8/8/8/8/4(PN)3/4K3 w - - 0 1").unwrap();
    assert_eq!(board.unmoved_pawns[0], 1 << 4);
}

#[test]
fn four_field_fen_defaults_the_clocks() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
    assert_eq!(board.halfmove_clock, 0);
    assert_eq!(board.fullmove, 1);
}

#[test]
fn malformed_fens_surface_errors() {
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4X3 w - - 0 1"),
        Err(FenError::InvalidPiece('X'))
    ));
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
        Err(FenError::InvalidSide(_))
    ));
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 w KZ - 0 1"),
        Err(FenError::InvalidCastling('Z'))
    ));
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
        Err(FenError::InvalidEnPassant(_))
    ));
    assert!(matches!(
        Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - zz 1"),
        Err(FenError::InvalidClock(_))
    ));
    assert!(matches!(
        Board::from_fen("rnbqkbnr/pppppppp"),
        Err(FenError::MissingFields(1))
    ));
}
