//! Game rules: move generation, move execution and end-of-game detection.
//!
//! All functions here are pure. [`apply_move`] returns a new [`Board`]
//! and never touches its input.

use std::fmt;
use std::str::FromStr;

use crate::board::{Board, Piece, Placement, Player, Square};
use crate::constants::{COLS, REPETITION_LIMIT, ROWS};

/// A cell as (row, column).
pub type Coord = (usize, usize);

/// A move: either a piece stepping on the board or a captured piece
/// dropped onto an empty cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Step { from: Coord, to: Coord },
    Drop { piece: Piece, to: Coord },
}

impl Move {
    /// Destination cell.
    pub fn to(&self) -> Coord {
        match *self {
            Move::Step { to, .. } | Move::Drop { to, .. } => to,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Step { from, to } => {
                write!(f, "({}, {}) -> ({}, {})", from.0, from.1, to.0, to.1)
            }
            Move::Drop { piece, to } => write!(f, "{} -> ({}, {})", piece.letter(), to.0, to.1),
        }
    }
}

/// Error parsing the text form of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    /// No `->` separator
    MissingArrow,
    /// A coordinate was not `(row, col)` with both in range
    BadCoord(String),
    /// Source was neither a coordinate nor a droppable piece letter
    BadPiece(String),
}

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoveError::MissingArrow => write!(f, "expected '<from> -> <to>'"),
            ParseMoveError::BadCoord(s) => write!(f, "bad coordinate '{s}'"),
            ParseMoveError::BadPiece(s) => write!(f, "bad drop piece '{s}'"),
        }
    }
}

impl std::error::Error for ParseMoveError {}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Parse `"(r, c) -> (r, c)"` or `"<letter> -> (r, c)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (src, dst) = s.split_once("->").ok_or(ParseMoveError::MissingArrow)?;
        let (src, dst) = (src.trim(), dst.trim());
        let to = parse_coord(dst)?;

        if src.starts_with('(') {
            return Ok(Move::Step {
                from: parse_coord(src)?,
                to,
            });
        }

        let mut chars = src.chars();
        match (chars.next().and_then(Piece::from_letter), chars.next()) {
            (Some(piece), None) if piece != Piece::Chicken => Ok(Move::Drop { piece, to }),
            _ => Err(ParseMoveError::BadPiece(src.to_string())),
        }
    }
}

fn parse_coord(s: &str) -> Result<Coord, ParseMoveError> {
    let bad = || ParseMoveError::BadCoord(s.to_string());
    let inner = s
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(bad)?;
    let (row, col) = inner.split_once(',').ok_or_else(bad)?;
    let row: usize = row.trim().parse().map_err(|_| bad())?;
    let col: usize = col.trim().parse().map_err(|_| bad())?;
    if row >= ROWS || col >= COLS {
        return Err(bad());
    }
    Ok((row, col))
}

// =============================================================================
// Movement patterns, as (row, col) offsets relative to the mover's forward
// direction: a negative row offset is "forward".
// =============================================================================

const LION_STEPS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ELEPHANT_STEPS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const GIRAFFE_STEPS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const CHICK_STEPS: [(isize, isize); 1] = [(-1, 0)];

/// Everything but the two backward diagonals.
const CHICKEN_STEPS: [(isize, isize); 6] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0)];

fn steps(piece: Piece) -> &'static [(isize, isize)] {
    match piece {
        Piece::Lion => &LION_STEPS,
        Piece::Elephant => &ELEPHANT_STEPS,
        Piece::Giraffe => &GIRAFFE_STEPS,
        Piece::Chick => &CHICK_STEPS,
        Piece::Chicken => &CHICKEN_STEPS,
    }
}

fn offset(from: Coord, dr: isize, dc: isize) -> Option<Coord> {
    let row = from.0.checked_add_signed(dr)?;
    let col = from.1.checked_add_signed(dc)?;
    (row < ROWS && col < COLS).then_some((row, col))
}

/// Candidate moves before the repetition filter.
fn pseudo_legal_moves(placement: &Placement) -> Vec<Move> {
    let me = placement.turn;
    let mut moves = Vec::new();

    // Drops: one per distinct held kind per empty cell
    for piece in placement.hands[me.index()].kinds() {
        for row in 0..ROWS {
            for col in 0..COLS {
                if placement.cells[row][col].is_none() {
                    moves.push(Move::Drop {
                        piece,
                        to: (row, col),
                    });
                }
            }
        }
    }

    // Board moves
    for row in 0..ROWS {
        for col in 0..COLS {
            let Some(sq) = placement.cells[row][col] else {
                continue;
            };
            if sq.owner != me {
                continue;
            }
            for &(dr, dc) in steps(sq.piece) {
                let Some(to) = offset((row, col), dr * -me.forward(), dc) else {
                    continue;
                };
                let blocked = placement.cells[to.0][to.1].is_some_and(|t| t.owner == me);
                if !blocked {
                    moves.push(Move::Step {
                        from: (row, col),
                        to,
                    });
                }
            }
        }
    }

    moves
}

/// The placement reached by playing `mv`.
///
/// Panics if `mv` is not playable on `placement`: that is a caller bug,
/// moves must come from [`generate_moves`].
fn next_placement(placement: &Placement, mv: &Move) -> Placement {
    let me = placement.turn;
    let mut next = *placement;

    match *mv {
        Move::Drop { piece, to } => {
            assert!(
                next.cells[to.0][to.1].is_none(),
                "drop {mv} onto an occupied cell"
            );
            assert!(
                next.hands[me.index()].remove(piece),
                "drop {mv}: {me} holds no such piece"
            );
            next.cells[to.0][to.1] = Some(Square::new(piece, me));
        }
        Move::Step { from, to } => {
            let mut moving = match next.cells[from.0][from.1] {
                Some(sq) if sq.owner == me => sq,
                _ => panic!("move {mv}: {me} has no piece on the source cell"),
            };
            assert!(
                steps(moving.piece)
                    .iter()
                    .any(|&(dr, dc)| offset(from, dr * -me.forward(), dc) == Some(to)),
                "move {mv}: {:?} cannot reach the destination",
                moving.piece
            );
            if let Some(target) = next.cells[to.0][to.1] {
                assert!(target.owner != me, "move {mv} captures own piece");
                next.hands[me.index()].add(target.piece.demoted());
            }
            if moving.piece == Piece::Chick && to.0 == me.far_row() {
                moving.piece = Piece::Chicken;
            }
            next.cells[to.0][to.1] = Some(moving);
            next.cells[from.0][from.1] = None;
        }
    }

    next.turn = me.opponent();
    next
}

/// All legal moves for the player to move.
///
/// Drops come first (by held kind, then cell in row-major order), followed
/// by board moves in row-major order of the moving piece. A move is left
/// out if the position it leads to has already occurred
/// `REPETITION_LIMIT - 1` times.
pub fn generate_moves(board: &Board) -> Vec<Move> {
    let placement = board.placement();
    pseudo_legal_moves(placement)
        .into_iter()
        .filter(|mv| {
            let key = next_placement(placement, mv).key();
            board.occurrences(&key) + 1 < REPETITION_LIMIT
        })
        .collect()
}

/// Play `mv` and return the resulting board.
///
/// The new board carries its own copy of the repetition history with the
/// count of the new position incremented.
pub fn apply_move(board: &Board, mv: &Move) -> Board {
    let next = next_placement(board.placement(), mv);
    let mut history = board.history().clone();
    *history.entry(next.key()).or_insert(0) += 1;
    Board::with_history(next, history)
}

/// The winner if the game is over, `None` otherwise.
///
/// Cells are scanned in row-major order and the first Lion standing on its
/// owner's far row wins by try. Failing that, a player with no Lion on the
/// board has been caught and loses.
pub fn game_result(board: &Board) -> Option<Player> {
    let mut lion_seen = [false; 2];
    for (row, cells) in board.placement().cells.iter().enumerate() {
        for sq in cells.iter().flatten() {
            if sq.piece != Piece::Lion {
                continue;
            }
            lion_seen[sq.owner.index()] = true;
            if row == sq.owner.far_row() {
                return Some(sq.owner);
            }
        }
    }

    if !lion_seen[Player::Player1.index()] {
        return Some(Player::Player2);
    }
    if !lion_seen[Player::Player2.index()] {
        return Some(Player::Player1);
    }
    None
}

#[inline]
pub fn is_terminal(board: &Board) -> bool {
    game_result(board).is_some()
}
