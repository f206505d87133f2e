//! Doubutsu-MCTS: animal shogi driven by Monte Carlo Tree Search.
//!
//! ## Usage
//!
//! - `doubutsu-mcts` - Search from the initial position and print the tree
//! - `doubutsu-mcts search --outer 100 --inner 100 --seed 1` - A shorter, reproducible search
//! - `doubutsu-mcts play --seed 1` - Play one random game and print every position

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use fastrand::Rng;

use doubutsu_mcts::board::{Board, Player};
use doubutsu_mcts::constants::{INNER_PLAYOUTS, OUTER_ITERATIONS, RENDER_DEPTH, REPORT_PERIOD};
use doubutsu_mcts::mcts::{Tree, dump_children};
use doubutsu_mcts::playout::play_game;
use doubutsu_mcts::rules::{Move, apply_move, game_result, generate_moves};
use doubutsu_mcts::search::{self, SearchConfig};

/// Doubutsu-MCTS: animal shogi with Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "doubutsu-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search from a position and print the resulting tree
    Search(SearchArgs),
    /// Play one random game from the initial position
    Play {
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Outer iterations
    #[arg(long, default_value_t = OUTER_ITERATIONS)]
    outer: usize,

    /// Playouts per outer iteration
    #[arg(long, default_value_t = INNER_PLAYOUTS)]
    inner: usize,

    /// Print progress every this many outer iterations
    #[arg(long, default_value_t = REPORT_PERIOD)]
    report_every: usize,

    /// Random seed (random if absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Depth of the printed tree
    #[arg(long, default_value_t = RENDER_DEPTH)]
    depth: usize,

    /// Moves to play before searching, e.g. "(2, 1) -> (1, 1)"
    #[arg(long)]
    opening: Vec<String>,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            outer: OUTER_ITERATIONS,
            inner: INNER_PLAYOUTS,
            report_every: REPORT_PERIOD,
            seed: None,
            depth: RENDER_DEPTH,
            opening: Vec::new(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Some(Commands::Play { seed }) => run_play(seed),
        Some(Commands::Search(args)) => run_search(args),
        None => run_search(SearchArgs::default()),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format_timestamp(None)
    .target(env_logger::Target::Stderr)
    .init();
}

fn make_rng(seed: Option<u64>) -> Rng {
    match seed {
        Some(seed) => Rng::with_seed(seed),
        None => Rng::new(),
    }
}

fn opening_position(opening: &[String]) -> Result<Board> {
    let mut board = Board::new();
    for text in opening {
        let mv: Move = text
            .parse()
            .with_context(|| format!("invalid opening move '{text}'"))?;
        if !generate_moves(&board).contains(&mv) {
            bail!("opening move '{mv}' is not legal for {}", board.turn());
        }
        board = apply_move(&board, &mv);
    }
    Ok(board)
}

fn run_search(args: SearchArgs) -> Result<()> {
    if args.outer == 0 || args.inner == 0 {
        bail!("--outer and --inner must both be at least 1");
    }

    let board = opening_position(&args.opening)?;
    if let Some(winner) = game_result(&board) {
        bail!("the opening already ends the game ({winner} wins)");
    }
    println!("{board}");

    let config = SearchConfig {
        outer_iterations: args.outer,
        inner_playouts: args.inner,
        report_period: args.report_every,
        focus: Player::Player1,
    };
    let mut rng = make_rng(args.seed);
    let mut tree = Tree::new(board);

    let summary = search::run(&mut tree, &config, &mut rng, |p| {
        println!(
            "{}: win rate: {:.1}%",
            p.iteration * config.inner_playouts,
            p.batch_win_rate * 100.0
        );
    });

    println!("{}", tree.render(Some(args.depth)));
    dump_children(&tree);
    if let Some((id, mv)) = tree.best_move() {
        println!("Best move: {mv} ({} visits)", tree.get(id).visits);
    }
    println!(
        "{} playouts, {} won by {} ({:.1}%), {} nodes",
        summary.playouts,
        summary.wins,
        config.focus,
        100.0 * summary.wins as f64 / summary.playouts as f64,
        tree.len()
    );
    Ok(())
}

fn run_play(seed: Option<u64>) -> Result<()> {
    let mut rng = make_rng(seed);
    let (end, winner) = play_game(&Board::new(), |board, moves| {
        println!("{board}");
        rng.usize(..moves.len())
    });
    println!("{end}");
    println!("{winner} wins!");
    Ok(())
}
