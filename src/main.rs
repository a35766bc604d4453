use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinError;
use keishi_engine::kifu::{parse_cell, OpeningBook};
use keishi_engine::{build_engine, Board, Engine, EngineKind, Game, Move, Player, TrapMap, SIZE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Human,
    Engine,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value = "human")]
    black: PlayerKind,
    #[arg(long, value_enum, default_value = "engine")]
    white: PlayerKind,
    #[arg(long, value_enum, default_value = "alpha-beta")]
    engine: EngineKind,
    /// Search depth in plies
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=7))]
    level: u32,
    /// Opening book, three lines per opening
    #[arg(long, default_value = "openings.txt")]
    book: PathBuf,
    #[arg(long, default_value_t = 4)]
    book_size: usize,
    /// 1-based opening number
    #[arg(long, default_value_t = 1)]
    opening: usize,
    /// Start from eight randomly placed stones instead of the book
    #[arg(long)]
    random: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Engine resigns when a search takes longer than this
    #[arg(long)]
    think_ms: Option<u64>,
    #[arg(long, default_value_t = 200)]
    max_plies: usize,
    /// Print the game record as JSON when the game ends
    #[arg(long)]
    json: bool,
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level.into())?;

    let initial = initial_board(&args)?;
    let mut game = Game::new(initial);
    let mut engines: [Option<Box<dyn Engine>>; 2] = [None, None];
    for (side, kind) in [(Player::Black, args.black), (Player::White, args.white)] {
        if kind == PlayerKind::Engine {
            let seed = args.seed.map(|seed| seed.wrapping_add(side.index() as u64 + 1));
            engines[side.index()] = Some(build_engine(args.engine, args.level, side, seed));
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    game.start();
    while game.is_playing() {
        print_board(game.board(), game.traps());
        if game.ply() >= args.max_plies {
            warn!("stopping after {} plies", game.ply());
            break;
        }
        let board = *game.board();
        let side = board.turn_holder();
        if board.enum_next_moves().is_empty() {
            warn!("{} has no legal move", side);
            game.resign(side)?;
            break;
        }

        match engines[side.index()].take() {
            Some(engine) => {
                let (engine, mv) = think(engine, board, args.think_ms).await?;
                engines[side.index()] = Some(engine);
                if mv.is_none() {
                    game.resign(side)?;
                } else {
                    game.play(mv)?;
                }
            }
            None => {
                println!("{} to move (e.g. 12-23, undo, resign):", side);
                let line = tokio::select! {
                    line = lines.next_line() => line?,
                    _ = tokio::signal::ctrl_c() => {
                        warn!("interrupted");
                        None
                    }
                };
                let Some(line) = line else {
                    game.resign(side)?;
                    break;
                };
                match line.trim() {
                    "resign" => game.resign(side)?,
                    "undo" => undo_turn(&mut game, side),
                    text => match parse_move(text) {
                        Some(mv) => {
                            if let Err(e) = game.play(mv) {
                                error!("{}", e);
                            }
                        }
                        None => error!("cannot read move {:?}", text),
                    },
                }
            }
        }
    }

    print_board(game.board(), game.traps());
    match game.winner() {
        Some(winner) => info!("{} wins after {} plies", winner, game.ply()),
        None => info!("no result after {} plies", game.ply()),
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&game.summary())?);
    }
    Ok(())
}

fn initial_board(args: &Args) -> Result<Board, Box<dyn Error>> {
    if args.random {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut board = Board::new();
        board.reset_random(&mut rng);
        return Ok(board);
    }
    let book = OpeningBook::load(&args.book, args.book_size)?;
    let opening = book.get(args.opening)
        .ok_or_else(|| format!("opening {} not in 1..={}", args.opening, book.len()))?;
    Ok(opening.board())
}

/// Runs a search off the async runtime. Think-time expiry or Ctrl-C cancels
/// it and waits for the search to unwind.
async fn think(
        mut engine: Box<dyn Engine>,
        board: Board,
        think_ms: Option<u64>,
) -> Result<(Box<dyn Engine>, Move), JoinError> {
    let handle = engine.cancel_handle();
    // a cancel that lost the race against the previous result must not carry over
    handle.reset();
    info!("{} is thinking", engine.name());
    let mut task = tokio::task::spawn_blocking(move || {
        let mv = engine.next_move(board);
        (engine, mv)
    });

    let deadline = async {
        match think_ms {
            Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        result = &mut task => return result,
        _ = deadline => warn!("think time exhausted"),
        _ = tokio::signal::ctrl_c() => warn!("interrupted"),
    }
    tokio::task::spawn_blocking(move || handle.cancel()).await?;
    task.await
}

/// Steps back to `side`'s previous turn.
fn undo_turn(game: &mut Game, side: Player) {
    let mut undone = false;
    while game.undo() {
        undone = true;
        if game.board().turn_holder() == side {
            break;
        }
    }
    if !undone {
        warn!("nothing to undo");
    }
}

fn parse_move(text: &str) -> Option<Move> {
    let (from, to) = text.split_once('-')?;
    Some(Move::new(parse_cell(from.trim()).ok()?, parse_cell(to.trim()).ok()?))
}

fn print_board(board: &Board, traps: &TrapMap) {
    println!("  12345");
    for y in 0..SIZE as i8 {
        let row: String = (0..SIZE as i8).map(|x| match (board.get_stone(x, y), traps.at(x, y)) {
            (Some(Player::Black), _) => 'x',
            (Some(Player::White), _) => 'o',
            (None, Some(Player::Black)) => '*',
            (None, Some(Player::White)) => '+',
            (None, None) => '-',
        }).collect();
        println!("{} {}", y + 1, row);
    }
}
