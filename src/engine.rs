use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use log::{debug, info, warn};
use serde::Serialize;
use crate::board::{Board, Player};
use crate::eval::{Evaluator, RandomEval, ShapeEval};
use crate::position::Move;

pub const INFINITY: i32 = i32::MAX;
/// Per remaining ply: a win found sooner scores higher.
pub const WIN_SCORE: i32 = 100;
pub const MAX_LEVEL: u32 = 7;

/// Cancellation flag polled by the search, plus an acknowledgement that the
/// search has unwound.
#[derive(Default)]
struct SearchControl {
    canceling: AtomicBool,
    running: Mutex<bool>,
    idle: Condvar,
}

impl SearchControl {
    fn is_canceling(&self) -> bool {
        self.canceling.load(Ordering::Relaxed)
    }

    fn enter(&self) -> RunningGuard<'_> {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) = true;
        RunningGuard(self)
    }
}

struct RunningGuard<'a>(&'a SearchControl);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.0.running.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.0.idle.notify_all();
    }
}

/// Lets another thread stop an engine's search.
#[derive(Clone)]
pub struct CancelHandle(Arc<SearchControl>);

impl CancelHandle {
    fn new() -> Self {
        Self(Arc::new(SearchControl::default()))
    }

    /// Requests cancellation and blocks until no search is running. The
    /// request stays in force for later searches until `reset`.
    pub fn cancel(&self) {
        self.0.canceling.store(true, Ordering::SeqCst);
        let mut running = self.0.running.lock().unwrap_or_else(PoisonError::into_inner);
        while *running {
            running = self.0.idle.wait(running).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn is_canceling(&self) -> bool {
        self.0.is_canceling()
    }

    pub fn reset(&self) {
        self.0.canceling.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// None when the root has no legal move or the search was stopped.
    pub best_move: Option<Move>,
    pub score: i32,
    pub nodes: u64,
    pub stopped: bool,
}

pub trait Engine: Send {
    fn search(&mut self, board: &Board) -> SearchOutcome;

    fn cancel_handle(&self) -> CancelHandle;

    fn side(&self) -> Player;

    fn name(&self) -> &str;

    /// Best move for the engine's side, `Move::NONE` if cancelled. Also
    /// `Move::NONE` when there is no legal move; check `enum_next_moves`
    /// first where that matters.
    fn next_move(&mut self, board: Board) -> Move {
        let outcome = self.search(&board);
        if outcome.stopped {
            return Move::NONE;
        }
        outcome.best_move.unwrap_or(Move::NONE)
    }
}

/// Shared state of the recursive searchers.
struct Searcher<E> {
    max_depth: u32,
    me: Player,
    evaluator: E,
    control: CancelHandle,
    nodes: u64,
    root_best: Option<Move>,
}

impl<E: Evaluator> Searcher<E> {
    fn new(max_depth: u32, me: Player, evaluator: E) -> Self {
        Self {
            max_depth: max_depth.max(1),
            me,
            evaluator,
            control: CancelHandle::new(),
            nodes: 0,
            root_best: None,
        }
    }

    fn win_score(&self, depth: u32, mine: bool) -> i32 {
        let score = (self.max_depth - depth) as i32 * WIN_SCORE;
        if mine { score } else { -score }
    }

    fn run<F>(&mut self, name: &str, board: &Board, read: F) -> SearchOutcome
            where F: FnOnce(&mut Self, &Board) -> Option<i32> {
        let control = self.control.clone();
        let _running = control.0.enter();
        if board.turn_holder() != self.me {
            warn!("{}: searching for {} but {} is to move", name, self.me, board.turn_holder());
        }
        self.nodes = 0;
        self.root_best = None;
        let score = read(self, board);
        let stopped = score.is_none() || control.is_canceling();
        if !stopped && self.root_best.is_none() {
            // every line scored -INFINITY; still play something legal
            self.root_best = board.enum_next_moves().first().copied();
        }
        if stopped {
            info!("{}: search cancelled after {} nodes", name, self.nodes);
        } else {
            info!("{}: best {:?} score {:?} ({} nodes)", name, self.root_best, score, self.nodes);
        }
        SearchOutcome {
            best_move: if stopped { None } else { self.root_best },
            score: score.unwrap_or(0),
            nodes: self.nodes,
            stopped,
        }
    }

    fn read_min_max(&mut self, board: &Board, depth: u32) -> Option<i32> {
        if self.control.is_canceling() {
            return None;
        }
        self.nodes += 1;
        if depth == self.max_depth {
            return Some(self.evaluator.evaluate(board, self.me));
        }

        let mover = board.turn_holder();
        let mine = mover == self.me;
        let mut best = if mine { -INFINITY } else { INFINITY };
        for mv in board.enum_next_moves() {
            let mut next = *board;
            next.do_move(mv);
            let eval = if next.is_square(mover) {
                self.win_score(depth, mine)
            } else {
                self.read_min_max(&next, depth + 1)?
            };
            if depth == 0 {
                debug!("{:?} : {}", mv, eval);
            }
            if (mine && eval > best) || (!mine && eval < best) {
                best = eval;
                if depth == 0 {
                    self.root_best = Some(mv);
                }
            }
        }
        Some(best)
    }

    fn read_alpha_beta(&mut self, board: &Board, depth: u32, mut alpha: i32, mut beta: i32) -> Option<i32> {
        if self.control.is_canceling() {
            return None;
        }
        self.nodes += 1;
        if depth == self.max_depth {
            return Some(self.evaluator.evaluate(board, self.me));
        }

        let mover = board.turn_holder();
        let mine = mover == self.me;
        for mv in board.enum_next_moves() {
            let mut next = *board;
            next.do_move(mv);
            let eval = if next.is_square(mover) {
                self.win_score(depth, mine)
            } else {
                self.read_alpha_beta(&next, depth + 1, alpha, beta)?
            };
            if depth == 0 {
                debug!("{:?} : {}", mv, eval);
            }
            if mine && eval > alpha {
                alpha = eval;
                if depth == 0 {
                    self.root_best = Some(mv);
                }
                if alpha >= beta {
                    alpha = beta;
                    break;
                }
            }
            if !mine && eval < beta {
                beta = eval;
                if depth == 0 {
                    self.root_best = Some(mv);
                }
                if beta <= alpha {
                    beta = alpha;
                    break;
                }
            }
        }
        Some(if mine { alpha } else { beta })
    }
}

/// Depth-limited minimax.
pub struct Minimax<E> {
    name: String,
    searcher: Searcher<E>,
}

impl<E: Evaluator> Minimax<E> {
    pub fn new(name: &str, max_depth: u32, me: Player, evaluator: E) -> Self {
        Self { name: name.to_string(), searcher: Searcher::new(max_depth, me, evaluator) }
    }
}

impl<E: Evaluator> Engine for Minimax<E> {
    fn search(&mut self, board: &Board) -> SearchOutcome {
        self.searcher.run(&self.name, board, |s, b| s.read_min_max(b, 0))
    }

    fn cancel_handle(&self) -> CancelHandle {
        self.searcher.control.clone()
    }

    fn side(&self) -> Player {
        self.searcher.me
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Minimax with alpha-beta pruning. Picks the same move with the same score
/// as `Minimax` under a deterministic evaluator, visiting fewer nodes.
pub struct AlphaBeta<E> {
    name: String,
    searcher: Searcher<E>,
}

impl<E: Evaluator> AlphaBeta<E> {
    pub fn new(name: &str, max_depth: u32, me: Player, evaluator: E) -> Self {
        Self { name: name.to_string(), searcher: Searcher::new(max_depth, me, evaluator) }
    }
}

impl<E: Evaluator> Engine for AlphaBeta<E> {
    fn search(&mut self, board: &Board) -> SearchOutcome {
        self.searcher.run(&self.name, board, |s, b| s.read_alpha_beta(b, 0, -INFINITY, INFINITY))
    }

    fn cancel_handle(&self) -> CancelHandle {
        self.searcher.control.clone()
    }

    fn side(&self) -> Player {
        self.searcher.me
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Minimax, random leaf scores
    Minimax,
    /// Minimax, square-likeness leaf scores
    MinimaxShape,
    /// Alpha-beta, square-likeness leaf scores
    AlphaBeta,
}

pub fn build_engine(kind: EngineKind, level: u32, side: Player, seed: Option<u64>) -> Box<dyn Engine> {
    let depth = level.clamp(1, MAX_LEVEL);
    let name = format!("{:?}-L{}-{}", kind, depth, side);
    match kind {
        EngineKind::Minimax => Box::new(Minimax::new(&name, depth, side, RandomEval::new(seed))),
        EngineKind::MinimaxShape => Box::new(Minimax::new(&name, depth, side, ShapeEval::new(seed))),
        EngineKind::AlphaBeta => Box::new(AlphaBeta::new(&name, depth, side, ShapeEval::new(seed))),
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
