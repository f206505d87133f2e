//! Board representation for 4x3 animal shogi.
//!
//! A [`Board`] is a [`Placement`] (grid, captured pieces, player to move)
//! plus the repetition history of the branch that produced it. Boards are
//! never mutated once built: every move yields a fresh board with its own
//! copy of the history, so snapshots held by different search branches are
//! fully independent.

use std::collections::HashMap;
use std::fmt;

use crate::constants::{COLS, KEY_LEN, PLAYER1_FAR_ROW, PLAYER2_FAR_ROW, ROWS};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Index into per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::Player1 => 0,
            Player::Player2 => 1,
        }
    }

    /// Row direction this player's pieces advance in.
    #[inline]
    pub fn forward(self) -> isize {
        match self {
            Player::Player1 => -1,
            Player::Player2 => 1,
        }
    }

    /// The opponent's back rank: where this player's Chick promotes and
    /// where this player's Lion completes a try.
    #[inline]
    pub fn far_row(self) -> usize {
        match self {
            Player::Player1 => PLAYER1_FAR_ROW,
            Player::Player2 => PLAYER2_FAR_ROW,
        }
    }

    pub fn digit(self) -> char {
        match self {
            Player::Player1 => '1',
            Player::Player2 => '2',
        }
    }

    fn from_digit(c: char) -> Option<Player> {
        match c {
            '1' => Some(Player::Player1),
            '2' => Some(Player::Player2),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player{}", self.digit())
    }
}

/// Piece kinds. The declaration order is the sort order of captured pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Piece {
    Lion,
    Elephant,
    Giraffe,
    Chick,
    /// A promoted Chick.
    Chicken,
}

impl Piece {
    /// Kinds that can sit in a hand, in sort order. A captured Chicken is
    /// held as a Chick.
    pub const HAND_KINDS: [Piece; 4] = [Piece::Lion, Piece::Elephant, Piece::Giraffe, Piece::Chick];

    pub fn letter(self) -> char {
        match self {
            Piece::Lion => 'L',
            Piece::Elephant => 'E',
            Piece::Giraffe => 'G',
            Piece::Chick => 'C',
            Piece::Chicken => 'H',
        }
    }

    pub fn from_letter(c: char) -> Option<Piece> {
        match c {
            'L' => Some(Piece::Lion),
            'E' => Some(Piece::Elephant),
            'G' => Some(Piece::Giraffe),
            'C' => Some(Piece::Chick),
            'H' => Some(Piece::Chicken),
            _ => None,
        }
    }

    /// The kind this piece becomes when captured.
    pub fn demoted(self) -> Piece {
        match self {
            Piece::Chicken => Piece::Chick,
            other => other,
        }
    }

    fn hand_slot(self) -> usize {
        match self.demoted() {
            Piece::Lion => 0,
            Piece::Elephant => 1,
            Piece::Giraffe => 2,
            _ => 3,
        }
    }
}

/// An occupied cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    pub piece: Piece,
    pub owner: Player,
}

impl Square {
    pub fn new(piece: Piece, owner: Player) -> Self {
        Self { piece, owner }
    }
}

/// Captured pieces held by one player.
///
/// Stored as per-kind counts, so two hands holding the same pieces compare
/// and encode identically whatever order the captures happened in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hand {
    counts: [u8; 4],
}

impl Hand {
    pub fn add(&mut self, piece: Piece) {
        self.counts[piece.hand_slot()] += 1;
    }

    /// Take one piece of this kind out of the hand. Returns false if the
    /// hand holds none.
    pub fn remove(&mut self, piece: Piece) -> bool {
        let slot = &mut self.counts[piece.hand_slot()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.counts[piece.hand_slot()] as usize
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct kinds held, in sort order.
    pub fn kinds(&self) -> impl Iterator<Item = Piece> + '_ {
        Piece::HAND_KINDS
            .into_iter()
            .filter(move |&p| self.count(p) > 0)
    }

    /// Every held piece, sorted.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        Piece::HAND_KINDS
            .into_iter()
            .flat_map(move |p| std::iter::repeat_n(p, self.count(p)))
    }
}

impl FromIterator<Piece> for Hand {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        let mut hand = Hand::default();
        for piece in iter {
            hand.add(piece);
        }
        hand
    }
}

/// Canonical encoding of a position: grid, both hands and the player to move.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey([u8; KEY_LEN]);

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every byte is ASCII.
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PositionKey({self})")
    }
}

/// Grid contents, captured pieces and the player to move, without history.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub cells: [[Option<Square>; COLS]; ROWS],
    pub hands: [Hand; 2],
    pub turn: Player,
}

impl Placement {
    /// The standard starting arrangement, Player1 to move.
    pub fn initial() -> Self {
        use Piece::*;
        use Player::*;

        let mut cells = [[None; COLS]; ROWS];
        cells[0] = [
            Some(Square::new(Giraffe, Player2)),
            Some(Square::new(Lion, Player2)),
            Some(Square::new(Elephant, Player2)),
        ];
        cells[1][1] = Some(Square::new(Chick, Player2));
        cells[2][1] = Some(Square::new(Chick, Player1));
        cells[3] = [
            Some(Square::new(Elephant, Player1)),
            Some(Square::new(Lion, Player1)),
            Some(Square::new(Giraffe, Player1)),
        ];

        Self {
            cells,
            hands: [Hand::default(); 2],
            turn: Player1,
        }
    }

    pub fn key(&self) -> PositionKey {
        let mut key = [0u8; KEY_LEN];
        let mut k = 0;
        for row in &self.cells {
            for cell in row {
                let (owner, piece) = match cell {
                    Some(sq) => (sq.owner.digit(), sq.piece.letter()),
                    None => ('-', '-'),
                };
                key[k] = owner as u8;
                key[k + 1] = piece as u8;
                k += 2;
            }
        }
        for hand in &self.hands {
            for kind in Piece::HAND_KINDS {
                key[k] = b'0' + hand.count(kind) as u8;
                k += 1;
            }
        }
        key[k] = self.turn.digit() as u8;
        PositionKey(key)
    }

    /// Pieces on the grid plus pieces in both hands.
    pub fn piece_count(&self) -> usize {
        let on_board = self.cells.iter().flatten().filter(|c| c.is_some()).count();
        on_board + self.hands.iter().map(Hand::len).sum::<usize>()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(sq) => format!("{}{}", sq.owner.digit(), sq.piece.letter()),
                    None => "--".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        writeln!(f)?;
        for player in [Player::Player1, Player::Player2] {
            let letters: Vec<String> = self.hands[player.index()]
                .pieces()
                .map(|p| p.letter().to_string())
                .collect();
            writeln!(f, "{player} has: {}", letters.join(" "))?;
        }
        writeln!(f, "- {}'s turn -", self.turn)
    }
}

/// Error building a board from text rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// A row did not hold exactly three cells
    CellCount { row: usize, found: usize },
    /// A cell was neither `--` nor `<owner digit><piece letter>`
    BadCell { row: usize, col: usize, text: String },
    /// A Chicken cannot be held in hand
    PromotedInHand,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::CellCount { row, found } => {
                write!(f, "row {row}: expected {COLS} cells, found {found}")
            }
            SetupError::BadCell { row, col, text } => {
                write!(f, "row {row}, col {col}: bad cell '{text}'")
            }
            SetupError::PromotedInHand => write!(f, "a Chicken cannot be held in hand"),
        }
    }
}

impl std::error::Error for SetupError {}

/// A position together with the repetition history of its branch.
#[derive(Clone, Debug)]
pub struct Board {
    placement: Placement,
    occurrences: HashMap<PositionKey, u32>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The starting position, Player1 to move.
    pub fn new() -> Self {
        Self::from_placement(Placement::initial())
    }

    /// Start a fresh history at the given placement.
    pub fn from_placement(placement: Placement) -> Self {
        let mut occurrences = HashMap::new();
        occurrences.insert(placement.key(), 1);
        Self {
            placement,
            occurrences,
        }
    }

    /// Build a board from text rows in the board text form
    /// (e.g. `"2G 2L 2E"`), the two hands and the player to move.
    ///
    /// No material checks are made, so positions missing a Lion can be
    /// described.
    pub fn setup(
        rows: [&str; ROWS],
        hands: [&[Piece]; 2],
        turn: Player,
    ) -> Result<Self, SetupError> {
        let mut cells = [[None; COLS]; ROWS];
        for (r, text) in rows.iter().enumerate() {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() != COLS {
                return Err(SetupError::CellCount {
                    row: r,
                    found: tokens.len(),
                });
            }
            for (c, token) in tokens.iter().enumerate() {
                cells[r][c] = parse_cell(token).ok_or_else(|| SetupError::BadCell {
                    row: r,
                    col: c,
                    text: token.to_string(),
                })?;
            }
        }

        let mut parsed_hands = [Hand::default(); 2];
        for (hand, pieces) in parsed_hands.iter_mut().zip(hands) {
            if pieces.contains(&Piece::Chicken) {
                return Err(SetupError::PromotedInHand);
            }
            *hand = pieces.iter().copied().collect();
        }

        Ok(Self::from_placement(Placement {
            cells,
            hands: parsed_hands,
            turn,
        }))
    }

    pub(crate) fn with_history(placement: Placement, occurrences: HashMap<PositionKey, u32>) -> Self {
        Self {
            placement,
            occurrences,
        }
    }

    #[inline]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[inline]
    pub fn turn(&self) -> Player {
        self.placement.turn
    }

    /// Contents of a cell. Panics if out of range.
    #[inline]
    pub fn square(&self, row: usize, col: usize) -> Option<Square> {
        self.placement.cells[row][col]
    }

    #[inline]
    pub fn hand(&self, player: Player) -> &Hand {
        &self.placement.hands[player.index()]
    }

    pub fn key(&self) -> PositionKey {
        self.placement.key()
    }

    /// How many times `key` has occurred along this board's history.
    pub fn occurrences(&self, key: &PositionKey) -> u32 {
        self.occurrences.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn history(&self) -> &HashMap<PositionKey, u32> {
        &self.occurrences
    }

    pub fn piece_count(&self) -> usize {
        self.placement.piece_count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.placement, f)
    }
}

fn parse_cell(token: &str) -> Option<Option<Square>> {
    if token == "--" {
        return Some(None);
    }
    let mut chars = token.chars();
    let owner = Player::from_digit(chars.next()?)?;
    let piece = Piece::from_letter(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(Some(Square::new(piece, owner)))
}
