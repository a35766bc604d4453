pub mod board;
pub mod engine;
pub mod eval;
pub mod game;
pub mod kifu;
pub mod position;
pub mod trap;

pub use board::{BitBoard, Board, Player, SIZE};
pub use engine::{build_engine, AlphaBeta, CancelHandle, Engine, EngineKind, Minimax, SearchOutcome};
pub use game::{Game, GameError, GameStatus};
pub use kifu::{KifuError, Opening, OpeningBook};
pub use position::{Move, Position};
pub use trap::TrapMap;
