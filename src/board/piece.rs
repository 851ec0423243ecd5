/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::Position;

/// Represents the color of a player or piece on a Xiangqi board.
///
/// Red traditionally moves first, and therefore [`Color`] defaults to [`Color::Red`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with Red.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::Red, Self::Black]
    }

    /// Returns this [`Color`]'s opposite.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Color;
    /// assert_eq!(Color::Red.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::Red);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// The row delta of one step "forward" for this color.
    ///
    /// Red starts at the bottom of the board (row 9) and advances towards row 0.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::Red => -1,
            Self::Black => 1,
        }
    }

    /// Returns a multiplier for negating numbers relative to this color.
    #[inline(always)]
    pub const fn negation_multiplier(&self) -> i32 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    /// Creates a [`Color`] from the side-to-move field of a FEN string.
    ///
    /// Both `w` and `r` are accepted for Red.
    pub fn from_fen(s: &str) -> Result<Self> {
        match s {
            "w" | "r" | "W" | "R" => Ok(Self::Red),
            "b" | "B" => Ok(Self::Black),
            _ => bail!("Invalid side to move {s:?}: expected one of `w`, `r`, or `b`"),
        }
    }

    /// Converts this [`Color`] into the side-to-move field of a FEN string.
    #[inline(always)]
    pub const fn to_fen(&self) -> char {
        match self {
            Self::Red => 'w',
            Self::Black => 'b',
        }
    }

    /// Fetches a human-readable name for this [`Color`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" | "w" => Ok(Self::Red),
            "black" | "b" => Ok(Self::Black),
            _ => bail!("Invalid color {s:?}: expected `red` or `black`"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// One of the seven kinds of Xiangqi pieces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 7;

    /// An array of all 7 [`PieceKind`]s.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::General,
            Self::Advisor,
            Self::Elephant,
            Self::Horse,
            Self::Chariot,
            Self::Cannon,
            Self::Soldier,
        ]
    }

    /// The letter used for this [`PieceKind`] in move notation.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::PieceKind;
    /// assert_eq!(PieceKind::General.symbol(), 'K');
    /// assert_eq!(PieceKind::Chariot.symbol(), 'R');
    /// ```
    #[inline(always)]
    pub const fn symbol(&self) -> char {
        match self {
            Self::General => 'K',
            Self::Advisor => 'A',
            Self::Elephant => 'E',
            Self::Horse => 'H',
            Self::Chariot => 'R',
            Self::Cannon => 'C',
            Self::Soldier => 'S',
        }
    }

    /// The lowercase FEN character for this [`PieceKind`].
    #[inline(always)]
    pub const fn fen_char(&self) -> char {
        match self {
            Self::General => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Horse => 'n',
            Self::Chariot => 'r',
            Self::Cannon => 'c',
            Self::Soldier => 'p',
        }
    }

    /// Parses a [`PieceKind`] from a FEN character, ignoring case.
    ///
    /// The letters `e`, `h`, and `s` are accepted alongside `b`, `n`, and `p`.
    pub fn from_fen_char(c: char) -> Result<Self> {
        Ok(match c.to_ascii_lowercase() {
            'k' => Self::General,
            'a' => Self::Advisor,
            'b' | 'e' => Self::Elephant,
            'n' | 'h' => Self::Horse,
            'r' => Self::Chariot,
            'c' => Self::Cannon,
            'p' | 's' => Self::Soldier,
            _ => bail!("Invalid piece character {c:?}"),
        })
    }

    /// Fetches a human-readable name for this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Advisor => "advisor",
            Self::Elephant => "elephant",
            Self::Horse => "horse",
            Self::Chariot => "chariot",
            Self::Cannon => "cannon",
            Self::Soldier => "soldier",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// Stable identity of a piece within a [`Board`](super::Board).
///
/// Doubles as the index of the piece's slot in the board's piece arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct PieceId(pub(crate) u8);

impl PieceId {
    /// Returns this [`PieceId`] as a `usize`, for indexing into the arena.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single physical piece: who it is, where it stands, and whether it has ever moved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    color: Color,
    position: Position,
    has_moved: bool,
}

impl Piece {
    /// Creates a new, unmoved [`Piece`].
    #[inline(always)]
    pub const fn new(id: PieceId, kind: PieceKind, color: Color, position: Position) -> Self {
        Self {
            id,
            kind,
            color,
            position,
            has_moved: false,
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[inline(always)]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Returns `true` if this piece is a [`PieceKind::General`].
    #[inline(always)]
    pub const fn is_general(&self) -> bool {
        matches!(self.kind, PieceKind::General)
    }

    /// The FEN character of this piece: uppercase for Red, lowercase for Black.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.fen_char();
        match self.color {
            Color::Red => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Moves this piece to `to`, marking it as moved.
    #[inline(always)]
    pub(crate) fn relocate(&mut self, to: Position) {
        self.position = to;
        self.has_moved = true;
    }

    /// Moves this piece back to `from`, restoring its previous moved flag.
    #[inline(always)]
    pub(crate) fn restore(&mut self, from: Position, had_moved: bool) {
        self.position = from;
        self.has_moved = had_moved;
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.color, self.kind, self.position)
    }
}
