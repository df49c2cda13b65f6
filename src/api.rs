//! Query surface for external collaborators.
//!
//! One request/response pair: a FEN in, the legal move list out. The HTTP
//! adapter that exposes this as JSON lives outside the core; the reply
//! types derive `Serialize` so it does not need to re-map anything.

use serde::Serialize;
use thiserror::Error;

use crate::board::{Board, FenError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("missing fen field")]
    MissingFen,
    #[error("invalid FEN '{fen}': {source}")]
    InvalidFen {
        fen: String,
        #[source]
        source: FenError,
    },
}

/// One legal move: UCI-extended string plus the move kind name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEntry {
    pub uci: String,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovesReply {
    pub count: usize,
    pub moves: Vec<MoveEntry>,
}

/// Legal moves of the position described by `fen`. No state is kept
/// across calls.
pub fn legal_moves(fen: &str) -> Result<MovesReply, EngineError> {
    if fen.trim().is_empty() {
        return Err(EngineError::MissingFen);
    }

    let mut board = Board::new();
    board.set_from_fen(fen).map_err(|source| EngineError::InvalidFen {
        fen: fen.to_string(),
        source,
    })?;

    let moves = board.generate_moves();
    let entries = moves
        .iter()
        .map(|m| MoveEntry {
            uci: m.to_uci(),
            kind: m.kind.name(),
        })
        .collect::<Vec<_>>();

    Ok(MovesReply {
        count: entries.len(),
        moves: entries,
    })
}
