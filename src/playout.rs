//! Game playouts.
//!
//! A playout plays moves from a position until the game ends. Search uses
//! uniformly random playouts; [`play_game`] takes any move chooser so the
//! same loop drives self-play from the command line.

use fastrand::Rng;
use log::{trace, warn};

use crate::board::{Board, Player};
use crate::rules::{Move, apply_move, game_result, generate_moves};

/// Play from `board` until the game is decided, asking `choose` for each move.
///
/// `choose` receives the board and its legal moves (never empty) and returns
/// an index into the move list. Returns the final board and the winner.
///
/// A non-terminal position with no legal move left (every candidate blocked
/// by the repetition limit) is scored as a loss for the player to move.
pub fn play_game<F>(board: &Board, mut choose: F) -> (Board, Player)
where
    F: FnMut(&Board, &[Move]) -> usize,
{
    let mut current = board.clone();
    let mut plies = 0usize;

    loop {
        if let Some(winner) = game_result(&current) {
            trace!("playout over after {plies} plies, {winner} wins");
            return (current, winner);
        }

        let moves = generate_moves(&current);
        if moves.is_empty() {
            let loser = current.turn();
            warn!("{loser} has no legal move after {plies} plies; scoring as a loss");
            return (current, loser.opponent());
        }

        let mv = moves[choose(&current, &moves)];
        current = apply_move(&current, &mv);
        plies += 1;
    }
}

/// Play uniformly random legal moves from `board` to the end of the game
/// and return the winner.
pub fn random_playout(board: &Board, rng: &mut Rng) -> Player {
    play_game(board, |_, moves| rng.usize(..moves.len())).1
}
