//! Search engine: iterative deepening alpha-beta with transposition table,
//! quiescence and killer/history move ordering.

pub mod params;
pub mod search;
pub mod stats;
pub mod tt;

pub use self::params::SearchParams;
pub use self::search::{Search, INFINITY, MAX_DEPTH};
pub use self::stats::{SearchInfo, SearchStats};
pub use self::tt::{NodeType, TTEntry, TranspositionTable};
