//! Doubutsu-MCTS: animal shogi (4x3 shogi) played by Monte Carlo Tree Search.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and search parameters
//! - [`board`] - Board representation, captured pieces, position keys
//! - [`rules`] - Move generation, move execution, game end detection
//! - [`playout`] - Random game simulation
//! - [`mcts`] - Arena-based search tree with UCB1 selection
//! - [`search`] - Search driver and progress reporting
//!
//! ## Example
//!
//! ```
//! use doubutsu_mcts::board::Board;
//! use doubutsu_mcts::mcts::Tree;
//! use doubutsu_mcts::search::run_playout;
//!
//! let mut tree = Tree::new(Board::new());
//! let mut rng = fastrand::Rng::with_seed(1);
//! for _ in 0..100 {
//!     run_playout(&mut tree, &mut rng);
//! }
//! if let Some((_, mv)) = tree.best_move() {
//!     println!("Best move: {mv}");
//! }
//! ```

pub mod board;
pub mod constants;
pub mod mcts;
pub mod playout;
pub mod rules;
pub mod search;
