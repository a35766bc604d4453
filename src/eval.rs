use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::board::{Board, Player};

/// Bound on heuristic scores; wins are scored outside this band.
pub const SCORE_LIMIT: i32 = 99;

/// Scores are from `me`'s point of view.
pub trait Evaluator: Send {
    fn evaluate(&mut self, board: &Board, me: Player) -> i32;
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Ignores the position: a small random score centred on zero.
pub struct RandomEval {
    rng: StdRng,
}

impl RandomEval {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Evaluator for RandomEval {
    fn evaluate(&mut self, _board: &Board, _me: Player) -> i32 {
        self.rng.gen_range(0..10) - self.rng.gen_range(0..10)
    }
}

/// Square-likeness of a side's stones, 0..=100. A perfect square scores
/// 100; sides without exactly four stones score 0.
pub fn square_rate(board: &Board, player: Player) -> i32 {
    match board.spread(player) {
        Some(spread) => 100 * 2 * spread.min() / spread.max(),
        None => 0,
    }
}

/// Difference of the two sides' square rates plus per-side random jitter,
/// clamped to +-SCORE_LIMIT.
pub struct ShapeEval {
    rng: StdRng,
    jitter: i32,
}

impl ShapeEval {
    pub const DEFAULT_JITTER: i32 = 10;

    pub fn new(seed: Option<u64>) -> Self {
        Self::with_jitter(seed, Self::DEFAULT_JITTER)
    }

    /// A jitter of 0 makes the evaluator deterministic.
    pub fn with_jitter(seed: Option<u64>, jitter: i32) -> Self {
        Self { rng: seeded(seed), jitter: jitter.max(0) }
    }

    fn noise(&mut self) -> i32 {
        if self.jitter == 0 { 0 } else { self.rng.gen_range(0..self.jitter) }
    }
}

impl Evaluator for ShapeEval {
    fn evaluate(&mut self, board: &Board, me: Player) -> i32 {
        let black = square_rate(board, Player::Black) + self.noise();
        let white = square_rate(board, Player::White) + self.noise();
        let eval = (black - white).clamp(-SCORE_LIMIT, SCORE_LIMIT);
        match me {
            Player::Black => eval,
            Player::White => -eval,
        }
    }
}
