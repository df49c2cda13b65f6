//! Perft node counter for the Klikschaak move generator.
//!
//! Walks the legal move tree to a fixed depth via make/unmake and prints
//! node counts per depth. `--divide` prints the per-root-move breakdown at
//! the requested depth, which is the fastest way to localize a generator
//! discrepancy.

use clap::Parser;
use std::time::Instant;

use klikschaak::board::{Board, START_FEN};

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Klikschaak move generator node counts")]
struct Args {
    /// Maximum depth to count
    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    /// Position to start from (extended FEN); defaults to the initial setup
    #[arg(short, long)]
    fen: Option<String>,

    /// Print per-move node counts at the maximum depth
    #[arg(long)]
    divide: bool,
}

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

fn main() {
    klikschaak::init();
    let args = Args::parse();

    let fen = args.fen.as_deref().unwrap_or(START_FEN);
    let mut board = match Board::from_fen(fen) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("invalid FEN '{fen}': {e}");
            std::process::exit(1);
        }
    };

    for depth in 1..=args.depth {
        let start = Instant::now();
        let nodes = perft(&mut board, depth);
        let elapsed = start.elapsed();
        println!(
            "perft({depth}) = {nodes}  [{:.3}s, {:.0} nodes/s]",
            elapsed.as_secs_f64(),
            nodes as f64 / elapsed.as_secs_f64().max(1e-9)
        );
    }

    if args.divide {
        println!("\ndivide({}):", args.depth);
        let mut total = 0u64;
        for mv in board.generate_moves() {
            let undo = board.make_move(mv);
            let nodes = if args.depth > 0 {
                perft(&mut board, args.depth - 1)
            } else {
                1
            };
            board.unmake_move(undo);
            total += nodes;
            println!("  {:8} {}", mv.to_uci(), nodes);
        }
        println!("  total    {total}");
    }
}
