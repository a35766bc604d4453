use log::debug;
use crate::board::{BitArr2D, BitBoard, Board, Player};
use crate::position::Position;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrapMap {
    threats: [BitBoard; 2],
    side_to_move: Player,
}

impl Default for TrapMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TrapMap {
    pub fn new() -> Self {
        Self {
            threats: [BitBoard::empty(); 2],
            side_to_move: Player::Black,
        }
    }

    /// Recomputes the whole map for `board`. Each side is scanned as if it
    /// were its turn, every candidate move on its own copy of the board.
    pub fn scan(board: &Board) -> Self {
        let mut map = Self::new();
        map.side_to_move = board.turn_holder();
        for player in Player::BOTH {
            let view = board.with_turn_holder(player);
            for mv in view.enum_next_moves() {
                let mut scratch = view;
                scratch.do_move(mv);
                if scratch.is_square(player) {
                    map.threats[player.index()].set_point(mv.to, true);
                }
            }
        }
        debug!(
            "trap scan: black {} white {}",
            map.threats[0].count_ones(),
            map.threats[1].count_ones()
        );
        map
    }

    pub fn threats(&self, player: Player) -> BitBoard {
        self.threats[player.index()]
    }

    pub fn is_threat(&self, player: Player, pos: Position) -> bool {
        Board::is_in_board(pos.x, pos.y) && self.threats[player.index()].has_point(pos)
    }

    /// Owner of the mark on a cell. A cell threatened by both sides reports
    /// the side to move, which gets to use it first.
    pub fn at(&self, x: i8, y: i8) -> Option<Player> {
        let pos = Position::new(x, y);
        let first = self.side_to_move;
        [first, first.opponent()].into_iter().find(|&player| self.is_threat(player, pos))
    }

    pub fn is_empty(&self) -> bool {
        self.threats.iter().all(|t| t.not_any())
    }
}

#[cfg(test)]
#[path = "trap_tests.rs"]
mod trap_tests;
