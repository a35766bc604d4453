use std::fmt;
use bitvec::{prelude::*, slice::IterOnes};
use lazy_static::lazy_static;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::position::{Move, Position};

pub const SIZE: usize = 5;
pub const CELLS: usize = SIZE * SIZE;
pub const STONES_PER_SIDE: usize = 4;
pub type BitBoard = BitArr!(for CELLS, in u32, Lsb0);
// one bit per cell, bit index is x + y * SIZE

pub trait BitArr2D {
    fn empty() -> Self;
    fn set_point(&mut self, pos: Position, value: bool);
    fn from_point(pos: Position) -> Self;
    fn has_point(&self, pos: Position) -> bool;
    type IterPoints<'a>: Iterator<Item=Position> + 'a where Self: 'a;
    fn iter_set_points(&'_ self) -> Self::IterPoints<'_>;
}

fn bit_index(pos: Position) -> usize {
    pos.x as usize + pos.y as usize * SIZE
}

fn point_of(idx: usize) -> Position {
    Position::new((idx % SIZE) as i8, (idx / SIZE) as i8)
}

impl BitArr2D for BitBoard {
    fn empty() -> Self {
        bitarr!(u32, Lsb0; 0; CELLS)
    }

    fn set_point(&mut self, pos: Position, value: bool) {
        self.set(bit_index(pos), value);
    }

    fn from_point(pos: Position) -> Self {
        let mut cell = BitBoard::empty();
        cell.set_point(pos, true);
        cell
    }

    fn has_point(&self, pos: Position) -> bool {
        self[bit_index(pos)]
    }

    type IterPoints<'a> = std::iter::Map<IterOnes<'a, u32, Lsb0>, fn(usize) -> Position>;

    fn iter_set_points(&'_ self) -> Self::IterPoints<'_> {
        self.iter_ones().map(point_of as fn(usize) -> Position)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black = 0,
    White = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::Black, Player::White];

    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Player::Black => f.write_str("black"),
            Player::White => f.write_str("white"),
        }
    }
}

/// Squared distances between four stones, sorted ascending.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spread {
    pub distances: [i32; 6],
}

impl Spread {
    pub fn of(cells: &[Position; STONES_PER_SIDE]) -> Self {
        let mut distances = [0; 6];
        let mut idx = 0;
        for i in 0..STONES_PER_SIDE {
            for j in (i + 1)..STONES_PER_SIDE {
                let dx = (cells[i].x - cells[j].x) as i32;
                let dy = (cells[i].y - cells[j].y) as i32;
                distances[idx] = dx * dx + dy * dy;
                idx += 1;
            }
        }
        distances.sort_unstable();
        Self { distances }
    }

    pub fn min(&self) -> i32 {
        self.distances[0]
    }

    pub fn max(&self) -> i32 {
        self.distances[5]
    }

    /// Four equal shortest distances (the sides) and two strictly longer
    /// ones (the diagonals).
    pub fn is_square(&self) -> bool {
        self.distances[0] == self.distances[3] && self.distances[3] < self.distances[4]
    }
}

fn collect_stones(stones: &BitBoard) -> Option<[Position; STONES_PER_SIDE]> {
    if stones.count_ones() != STONES_PER_SIDE {
        return None;
    }
    let mut cells = [Position::NONE; STONES_PER_SIDE];
    for (cell, pos) in cells.iter_mut().zip(stones.iter_set_points()) {
        *cell = pos;
    }
    Some(cells)
}

/// Reference definition of a square win, from pairwise distances.
pub fn is_square_geometric(stones: &BitBoard) -> bool {
    collect_stones(stones).map_or(false, |cells| Spread::of(&cells).is_square())
}

/// Table-driven square check; agrees with `is_square_geometric`.
pub fn is_square_pattern(stones: &BitBoard) -> bool {
    stones.count_ones() == STONES_PER_SIDE && SQUARE_MASKS.iter().any(|mask| mask == stones)
}

lazy_static! {
    /// Every square that fits on the board, one mask per placement.
    pub static ref SQUARE_MASKS: Vec<BitBoard> = {
        let mut masks = Vec::<BitBoard>::new();
        let size = SIZE as i8;
        // side vector (a, b) with a >= 1, b >= 0 names each square exactly once
        for a in 1..size {
            for b in 0..(size - a) {
                for x in 0..size {
                    for y in 0..size {
                        let corners = [
                            Position::new(x, y),
                            Position::new(x + a, y + b),
                            Position::new(x + a - b, y + b + a),
                            Position::new(x - b, y + a),
                        ];
                        if corners.iter().all(|c| Board::is_in_board(c.x, c.y)) {
                            let mut mask = BitBoard::empty();
                            for corner in corners {
                                mask.set_point(corner, true);
                            }
                            masks.push(mask);
                        }
                    }
                }
            }
        }
        debug!("built {} square masks", masks.len());
        masks
    };
}

const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    black_stones: BitBoard,
    white_stones: BitBoard,
    turn: u32,
    last_moves: [Move; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            black_stones: BitBoard::empty(),
            white_stones: BitBoard::empty(),
            turn: 0,
            last_moves: [Move::NONE; 2],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Resets and places a fixed opening. Placements are expected to be
    /// validated already.
    pub fn reset_with(
            &mut self,
            black: &[Position; STONES_PER_SIDE],
            white: &[Position; STONES_PER_SIDE],
    ) {
        self.reset();
        for i in 0..STONES_PER_SIDE {
            self.set_stone(black[i].x, black[i].y, Player::Black);
            self.set_stone(white[i].x, white[i].y, Player::White);
        }
    }

    /// Resets and drops eight stones on distinct random cells, black first
    /// and alternating.
    pub fn reset_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.reset();
        for i in 0..STONES_PER_SIDE * 2 {
            let (x, y) = loop {
                let x = rng.gen_range(0..SIZE as i8);
                let y = rng.gen_range(0..SIZE as i8);
                if self.get_stone(x, y).is_none() {
                    break (x, y);
                }
            };
            let owner = if i % 2 == 0 { Player::Black } else { Player::White };
            self.set_stone(x, y, owner);
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn turn_holder(&self) -> Player {
        if self.turn % 2 == 0 { Player::Black } else { Player::White }
    }

    /// Same position with `player` to move. Stones and last moves are kept.
    pub fn with_turn_holder(&self, player: Player) -> Self {
        let mut board = *self;
        if board.turn_holder() != player {
            board.turn += 1;
        }
        board
    }

    pub fn last_move(&self, player: Player) -> Move {
        self.last_moves[player.index()]
    }

    pub fn stones(&self, player: Player) -> BitBoard {
        match player {
            Player::Black => self.black_stones,
            Player::White => self.white_stones,
        }
    }

    fn stones_mut(&mut self, player: Player) -> &mut BitBoard {
        match player {
            Player::Black => &mut self.black_stones,
            Player::White => &mut self.white_stones,
        }
    }

    pub fn is_in_board(x: i8, y: i8) -> bool {
        (0..SIZE as i8).contains(&x) && (0..SIZE as i8).contains(&y)
    }

    pub fn get_stone(&self, x: i8, y: i8) -> Option<Player> {
        if !Self::is_in_board(x, y) {
            return None;
        }
        let pos = Position::new(x, y);
        if self.black_stones.has_point(pos) {
            Some(Player::Black)
        } else if self.white_stones.has_point(pos) {
            Some(Player::White)
        } else {
            None
        }
    }

    /// Occupies a cell for `owner`, clearing the other side's bit.
    pub fn set_stone(&mut self, x: i8, y: i8, owner: Player) {
        let pos = Position::new(x, y);
        self.stones_mut(owner).set_point(pos, true);
        self.stones_mut(owner.opponent()).set_point(pos, false);
    }

    pub fn clear_stone(&mut self, x: i8, y: i8) {
        let pos = Position::new(x, y);
        self.black_stones.set_point(pos, false);
        self.white_stones.set_point(pos, false);
    }

    pub fn is_my_stone(&self, pos: Position) -> bool {
        self.get_stone(pos.x, pos.y) == Some(self.turn_holder())
    }

    pub fn is_no_stone(&self, pos: Position) -> bool {
        Self::is_in_board(pos.x, pos.y) && self.get_stone(pos.x, pos.y).is_none()
    }

    fn is_dawdling(&self, mv: Move) -> bool {
        self.last_moves[self.turn_holder().index()].invert() == mv
    }

    pub fn is_available_move(&self, from: Position, to: Position) -> bool {
        if !self.is_my_stone(from) || !self.is_no_stone(to) {
            return false;
        }
        if self.is_dawdling(Move::new(from, to)) {
            return false;
        }
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        dx <= 1 && dy <= 1
    }

    /// Applies a move without validating it; gate with `is_available_move`.
    pub fn do_move(&mut self, mv: Move) {
        let mine = self.turn_holder();
        self.clear_stone(mv.from.x, mv.from.y);
        self.set_stone(mv.to.x, mv.to.y, mine);
        self.last_moves[mine.index()] = mv;
        self.turn += 1;
    }

    pub fn is_square(&self, player: Player) -> bool {
        is_square_pattern(&self.stones(player))
    }

    /// Distance profile of a side's stones, if it has exactly four.
    pub fn spread(&self, player: Player) -> Option<Spread> {
        collect_stones(&self.stones(player)).map(|cells| Spread::of(&cells))
    }

    pub fn enum_next_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(STONES_PER_SIDE * DIRECTIONS.len());
        for from in self.stones(self.turn_holder()).iter_set_points() {
            for (dx, dy) in DIRECTIONS {
                let to = from.offset(dx, dy);
                if !self.is_no_stone(to) {
                    continue;
                }
                let mv = Move::new(from, to);
                if self.is_dawdling(mv) {
                    continue;
                }
                moves.push(mv);
            }
        }
        moves
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..SIZE as i8 {
            for x in 0..SIZE as i8 {
                let c = match self.get_stone(x, y) {
                    Some(Player::Black) => 'x',
                    Some(Player::White) => 'o',
                    None => '-',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
