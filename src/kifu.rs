//! Opening book: three lines per opening, a black record, a white record and
//! a separator. A record looks like `B11,15,51,55`: a side marker followed by
//! four 1-based cells, x digit then y digit.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use log::info;
use crate::board::{Board, Player, STONES_PER_SIDE};
use crate::position::Position;

const MIN_RECORD_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum KifuError {
    #[error("record {0:?} is too short")]
    TooShort(String),

    #[error("unknown side marker {0:?}")]
    BadSide(char),

    #[error("expected 4 cells, found {0}")]
    CellCount(usize),

    #[error("cell {0:?} is not a pair of digits 1-5")]
    BadCell(String),

    #[error("cell {0:?} is listed twice")]
    DuplicateCell(String),

    #[error("opening {index}: expected a {expected} record, found {found}")]
    WrongSide { index: usize, expected: Player, found: Player },

    #[error("opening {index}: black and white share a cell")]
    Overlap { index: usize },

    #[error("expected {expected} openings but the book has only {lines} lines")]
    TooFewLines { expected: usize, lines: usize },

    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),
}

pub type KifuResult<T> = Result<T, KifuError>;

/// Parses a 1-based two-digit cell such as `35` into a board position.
pub fn parse_cell(item: &str) -> KifuResult<Position> {
    let bad = || KifuError::BadCell(item.to_string());
    let mut digits = item.chars().map(|c| c.to_digit(10));
    let (x, y) = match (digits.next(), digits.next(), digits.next()) {
        (Some(Some(x)), Some(Some(y)), None) => (x as i8 - 1, y as i8 - 1),
        _ => return Err(bad()),
    };
    if !Board::is_in_board(x, y) {
        return Err(bad());
    }
    Ok(Position::new(x, y))
}

/// One side's four stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub player: Player,
    pub stones: [Position; STONES_PER_SIDE],
}

impl FromStr for Placement {
    type Err = KifuError;

    fn from_str(s: &str) -> KifuResult<Self> {
        let s = s.trim_end();
        if s.chars().count() < MIN_RECORD_LEN {
            return Err(KifuError::TooShort(s.to_string()));
        }
        let mut chars = s.chars();
        let player = match chars.next() {
            Some('B') | Some('b') => Player::Black,
            Some('W') | Some('w') => Player::White,
            Some(other) => return Err(KifuError::BadSide(other)),
            None => return Err(KifuError::TooShort(s.to_string())),
        };
        let items: Vec<&str> = chars.as_str().split(',').filter(|item| !item.is_empty()).collect();
        if items.len() != STONES_PER_SIDE {
            return Err(KifuError::CellCount(items.len()));
        }
        let mut stones = [Position::NONE; STONES_PER_SIDE];
        for (i, item) in items.iter().enumerate() {
            let cell = parse_cell(item)?;
            if stones[..i].contains(&cell) {
                return Err(KifuError::DuplicateCell(item.to_string()));
            }
            stones[i] = cell;
        }
        Ok(Placement { player, stones })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = match self.player {
            Player::Black => 'B',
            Player::White => 'W',
        };
        write!(f, "{}", marker)?;
        for (i, cell) in self.stones.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", cell.x + 1, cell.y + 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    pub black: [Position; STONES_PER_SIDE],
    pub white: [Position; STONES_PER_SIDE],
}

impl Opening {
    pub fn board(&self) -> Board {
        let mut board = Board::new();
        board.reset_with(&self.black, &self.white);
        board
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    openings: Vec<Opening>,
}

impl OpeningBook {
    /// Reads exactly `count` openings; any malformed record rejects the
    /// whole book.
    pub fn parse(text: &str, count: usize) -> KifuResult<Self> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < (count * 3).saturating_sub(1) {
            return Err(KifuError::TooFewLines { expected: count, lines: lines.len() });
        }
        let mut openings = Vec::with_capacity(count);
        for index in 0..count {
            let black: Placement = lines[index * 3].parse()?;
            let white: Placement = lines[index * 3 + 1].parse()?;
            for (record, expected) in [(&black, Player::Black), (&white, Player::White)] {
                if record.player != expected {
                    return Err(KifuError::WrongSide { index: index + 1, expected, found: record.player });
                }
            }
            if black.stones.iter().any(|cell| white.stones.contains(cell)) {
                return Err(KifuError::Overlap { index: index + 1 });
            }
            openings.push(Opening { black: black.stones, white: white.stones });
        }
        Ok(Self { openings })
    }

    pub fn load<P: AsRef<Path>>(path: P, count: usize) -> KifuResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let book = Self::parse(&text, count)?;
        info!("loaded {} openings from {}", book.len(), path.as_ref().display());
        Ok(book)
    }

    /// Opening by 1-based number.
    pub fn get(&self, number: usize) -> Option<&Opening> {
        number.checked_sub(1).and_then(|i| self.openings.get(i))
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

#[cfg(test)]
#[path = "kifu_tests.rs"]
mod kifu_tests;
