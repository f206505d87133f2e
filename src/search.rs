//! Search driver: runs batches of playouts against a tree and reports
//! progress.
//!
//! Each playout descends from the root by alternating UCB1 selection and
//! uniformly random selection, one tree level each, until it reaches a
//! childless node. The alternation is fixed by depth, not by whose turn
//! it is at that node.

use fastrand::Rng;
use log::{debug, info};

use crate::board::Player;
use crate::constants::{INNER_PLAYOUTS, OUTER_ITERATIONS, REPORT_PERIOD};
use crate::mcts::{NodeId, Tree};

/// Parameters of a search run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of outer iterations
    pub outer_iterations: usize,
    /// Playouts per outer iteration
    pub inner_playouts: usize,
    /// Report after every this many outer iterations
    pub report_period: usize,
    /// The player whose wins are tallied
    pub focus: Player,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            outer_iterations: OUTER_ITERATIONS,
            inner_playouts: INNER_PLAYOUTS,
            report_period: REPORT_PERIOD,
            focus: Player::Player1,
        }
    }
}

/// Progress after one reporting iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Outer iteration just finished (0-based)
    pub iteration: usize,
    /// Playouts run so far
    pub playouts: usize,
    /// Win rate of the focus player over the last batch
    pub batch_win_rate: f64,
    /// Win rate of the focus player over the whole run
    pub total_win_rate: f64,
}

/// Totals of a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub playouts: usize,
    pub wins: usize,
}

/// Descend from the root to a leaf: UCB1 choice, then random choice,
/// repeated until a node has no children.
pub fn select_leaf(tree: &Tree, rng: &mut Rng) -> NodeId {
    let mut node = tree.root();
    loop {
        let Some(best) = tree.select_best_child(node) else {
            return node;
        };
        node = best;

        let Some(reply) = tree.select_random_child(node, rng) else {
            return node;
        };
        node = reply;
    }
}

/// Run one playout through the selection protocol and return its winner.
pub fn run_playout(tree: &mut Tree, rng: &mut Rng) -> Player {
    let leaf = select_leaf(tree, rng);
    tree.simulate_and_expand(leaf, rng)
}

/// Run a full search, calling `report` after the first outer iteration
/// and every `report_period` iterations after it.
pub fn run<F>(tree: &mut Tree, config: &SearchConfig, rng: &mut Rng, mut report: F) -> SearchSummary
where
    F: FnMut(&Progress),
{
    debug!("search config: {config:?}");
    let mut summary = SearchSummary {
        playouts: 0,
        wins: 0,
    };

    for iteration in 0..config.outer_iterations {
        let mut batch_wins = 0;
        for _ in 0..config.inner_playouts {
            if run_playout(tree, rng) == config.focus {
                batch_wins += 1;
            }
        }
        summary.playouts += config.inner_playouts;
        summary.wins += batch_wins;

        if config.report_period > 0 && iteration % config.report_period == 0 {
            let progress = Progress {
                iteration,
                playouts: summary.playouts,
                batch_win_rate: rate(batch_wins, config.inner_playouts),
                total_win_rate: rate(summary.wins, summary.playouts),
            };
            info!(
                "{} playouts, batch win rate {:.1}%, tree size {}",
                progress.playouts,
                progress.batch_win_rate * 100.0,
                tree.len()
            );
            report(&progress);
        }
    }

    summary
}

fn rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}
