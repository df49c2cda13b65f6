//! Search behavior invariants: mate handling, timeout semantics, bounded
//! transposition table, and the search leaving its board untouched.

use klikschaak::board::{Board, Color, START_FEN};
use klikschaak::eval::CHECKMATE_SCORE;
use klikschaak::{Search, SearchParams};

#[test]
fn search_board_is_unchanged_after_search() {
    let board = Board::from_fen(START_FEN).unwrap();
    let fen_before = board.to_fen();
    let zobrist_before = board.zobrist;

    let mut search = Search::new(board, SearchParams::new().max_depth(4));
    let (best, _) = search.search(None);
    assert!(best.is_some());
    assert_eq!(search.board().to_fen(), fen_before);
    assert_eq!(search.board().zobrist, zobrist_before);
}

#[test]
fn mate_in_one_scores_near_checkmate() {
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
    let mut search = Search::new(board, SearchParams::new().max_depth(4));
    let (best, info) = search.search(None);

    let best = best.expect("mating move");
    assert_eq!(best.to_uci(), "a1a8");
    assert!(
        info.score > CHECKMATE_SCORE - 100,
        "mate score offset by depth, got {}",
        info.score
    );
}

#[test]
fn shorter_mate_is_preferred() {
    // Two rooks ladder: mate in one available, search must take it rather
    // than a slower mate
    let board = Board::from_fen("6k1/R7/1R6/8/8/8/8/4K3 w - - 0 1").unwrap();
    let mut search = Search::new(board, SearchParams::new().max_depth(5));
    let (best, _) = search.search(None);
    let best = best.expect("mating move");
    assert_eq!(best.to_uci(), "b6b8", "rank-8 mate with the a7 rook guarding");
}

#[test]
fn checkmate_and_stalemate_return_no_move() {
    let board =
        Board::from_fen("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    let mut search = Search::with_board(board);
    let (best, _) = search.search(Some(3));
    assert!(best.is_none());
    assert!(search.board().is_in_check(Color::White), "mate, not stalemate");

    let board = Board::from_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1").unwrap();
    let mut search = Search::with_board(board);
    let (best, _) = search.search(Some(3));
    assert!(best.is_none());
    assert!(!search.board().is_in_check(Color::Black), "stalemate, not mate");
}

#[test]
fn timeout_returns_best_of_completed_depths() {
    let board = Board::from_fen(START_FEN).unwrap();
    let params = SearchParams::new().max_depth(40).time_limit(50);
    let mut search = Search::new(board, params);

    let (best, info) = search.search(None);
    assert!(best.is_some(), "timeout still yields a move");
    assert!(info.depth < 40, "depth 40 cannot complete in 50ms");
}

#[test]
fn transposition_table_is_bounded() {
    let board = Board::from_fen(START_FEN).unwrap();
    let params = SearchParams::new().max_depth(4).tt_entries(1024);
    let mut search = Search::new(board, params);
    search.search(None);

    assert_eq!(search.tt().capacity(), 1024);
    assert!(search.tt().occupied() <= 1024);
    assert!(search.tt().occupied() > 0, "search stores entries");

    search.clear();
    assert_eq!(search.tt().occupied(), 0);
}

#[test]
fn depth_reports_grow_monotonically() {
    let board = Board::from_fen(START_FEN).unwrap();
    let mut search = Search::new(board, SearchParams::new().max_depth(4));
    search.search(None);

    let reports = &search.stats().depth_reports;
    assert_eq!(reports.len(), 4);
    for (i, info) in reports.iter().enumerate() {
        assert_eq!(info.depth as usize, i + 1);
    }
    for pair in reports.windows(2) {
        assert!(pair[1].nodes >= pair[0].nodes, "node counts are cumulative");
    }
}
