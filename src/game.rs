use log::{info, warn};
use serde::Serialize;
use crate::board::{BitArr2D, Board, Player};
use crate::position::{Move, Position};
use crate::trap::TrapMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game is not in progress")]
    NotPlaying,

    #[error("illegal move {0:?}")]
    IllegalMove(Move),
}

pub type GameResult<T> = Result<T, GameError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GameStatus {
    Ready,
    Playing,
    Finished { winner: Player },
    Resigned { loser: Player },
}

#[derive(Debug, Clone, Serialize)]
pub struct Stones {
    pub black: Vec<Position>,
    pub white: Vec<Position>,
}

impl Stones {
    fn of(board: &Board) -> Self {
        Self {
            black: board.stones(Player::Black).iter_set_points().collect(),
            white: board.stones(Player::White).iter_set_points().collect(),
        }
    }
}

/// Serializable record of a game.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub status: GameStatus,
    pub initial: Stones,
    pub moves: Vec<Move>,
    pub last: Stones,
}

pub struct Game {
    record: Vec<Board>,
    moves: Vec<Move>,
    cursor: usize,
    traps: TrapMap,
    status: GameStatus,
}

impl Game {
    pub fn new(initial: Board) -> Self {
        Self {
            record: vec![initial],
            moves: Vec::new(),
            cursor: 0,
            traps: TrapMap::scan(&initial),
            status: GameStatus::Ready,
        }
    }

    pub fn start(&mut self) {
        info!("game started, {} to move", self.board().turn_holder());
        self.status = GameStatus::Playing;
    }

    /// Board at the history cursor.
    pub fn board(&self) -> &Board {
        &self.record[self.cursor]
    }

    pub fn traps(&self) -> &TrapMap {
        &self.traps
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Plies from the initial board to the cursor.
    pub fn ply(&self) -> usize {
        self.cursor
    }

    /// Moves leading to the board at the cursor.
    pub fn moves(&self) -> &[Move] {
        &self.moves[..self.cursor]
    }

    /// Validates and applies a move at the cursor, dropping any redo tail.
    /// Returns the winner if the move completes a square.
    pub fn play(&mut self, mv: Move) -> GameResult<Option<Player>> {
        if !self.is_playing() {
            return Err(GameError::NotPlaying);
        }
        let mut board = *self.board();
        if !board.is_available_move(mv.from, mv.to) {
            warn!("rejected illegal move {:?}", mv);
            return Err(GameError::IllegalMove(mv));
        }
        let mover = board.turn_holder();
        board.do_move(mv);

        self.record.truncate(self.cursor + 1);
        self.moves.truncate(self.cursor);
        self.record.push(board);
        self.moves.push(mv);
        self.cursor += 1;
        self.traps = TrapMap::scan(&board);
        info!("ply {}: {} plays {:?}", self.cursor, mover, mv);

        if board.is_square(mover) {
            info!("{} completes a square", mover);
            self.status = GameStatus::Finished { winner: mover };
            return Ok(Some(mover));
        }
        Ok(None)
    }

    pub fn resign(&mut self, loser: Player) -> GameResult<()> {
        if !self.is_playing() {
            return Err(GameError::NotPlaying);
        }
        info!("{} resigns", loser);
        self.status = GameStatus::Resigned { loser };
        Ok(())
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Finished { winner } => Some(winner),
            GameStatus::Resigned { loser } => Some(loser.opponent()),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.record.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.traps = TrapMap::scan(self.board());
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.traps = TrapMap::scan(self.board());
        true
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            status: self.status,
            initial: Stones::of(&self.record[0]),
            moves: self.moves().to_vec(),
            last: Stones::of(self.board()),
        }
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
