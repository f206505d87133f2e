//! Constants for board geometry, search parameters, and driver defaults.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows (ranks). Row 0 is Player2's back rank.
pub const ROWS: usize = 4;

/// Number of columns (files).
pub const COLS: usize = 3;

/// Row a Player1 Chick promotes on, and the row a Player1 Lion "tries" on.
pub const PLAYER1_FAR_ROW: usize = 0;

/// Row a Player2 Chick promotes on, and the row a Player2 Lion "tries" on.
pub const PLAYER2_FAR_ROW: usize = ROWS - 1;

/// Pieces on the board at the start of the game (two of each kind).
pub const TOTAL_PIECES: usize = 8;

/// Length of a canonical position key: one owner byte and one piece byte
/// per cell, hand counts for both players, and the player to move.
pub const KEY_LEN: usize = ROWS * COLS * 2 + 2 * 4 + 1;

// =============================================================================
// Repetition
// =============================================================================

/// A move is refused if it would make the same position (including the
/// player to move) occur this many times.
pub const REPETITION_LIMIT: u32 = 4;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Visits a childless node needs before it is expanded.
pub const EXPAND_VISITS: u32 = 10;

/// UCB1 exploration constant.
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

// =============================================================================
// Driver Defaults
// =============================================================================

/// Default number of outer iterations.
pub const OUTER_ITERATIONS: usize = 1001;

/// Default number of playouts per outer iteration.
pub const INNER_PLAYOUTS: usize = 1000;

/// Print a progress line every this many outer iterations.
pub const REPORT_PERIOD: usize = 100;

/// Default depth of the rendered tree.
pub const RENDER_DEPTH: usize = 2;
