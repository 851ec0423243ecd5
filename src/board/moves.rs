/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Context, Result};

use super::{Piece, Position};

/// A move that has been executed on a board.
///
/// Records a snapshot of the moving piece as it was *before* the move, and a snapshot of the captured piece, if any.
/// This is everything needed to revert the move later.
///
/// A [`Move`] is immutable once created.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    from: Position,
    to: Position,
    piece: Piece,
    captured: Option<Piece>,
    notation: String,
}

impl Move {
    /// Creates a new [`Move`] of `piece` to `to`, generating its notation.
    ///
    /// The notation is the piece's letter, the origin, an `x` if the move captures, and the destination.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, Move, Position};
    /// let board = Board::standard();
    /// let horse = *board.piece_at("b0".parse().unwrap()).unwrap();
    /// let mv = Move::new(horse, "c2".parse().unwrap(), None);
    /// assert_eq!(mv.notation(), "Hb0c2");
    /// ```
    pub fn new(piece: Piece, to: Position, captured: Option<Piece>) -> Self {
        let from = piece.position();
        let marker = if captured.is_some() { "x" } else { "" };
        let notation = format!("{}{from}{marker}{to}", piece.kind().symbol());

        Self {
            from,
            to,
            piece,
            captured,
            notation,
        }
    }

    /// The origin of this move.
    #[inline(always)]
    pub const fn from(&self) -> Position {
        self.from
    }

    /// The destination of this move.
    #[inline(always)]
    pub const fn to(&self) -> Position {
        self.to
    }

    /// The moving piece, as it was before the move.
    #[inline(always)]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    /// The piece that was captured, as it was before the move.
    #[inline(always)]
    pub const fn captured(&self) -> Option<&Piece> {
        self.captured.as_ref()
    }

    /// Returns `true` if this move removed an enemy piece.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline(always)]
    pub fn notation(&self) -> &str {
        &self.notation
    }
}

impl fmt::Display for Move {
    /// A [`Move`] is displayed as its notation.
    ///
    /// If the alternate format mode (`#`) was specified, only the coordinates are printed, like `b0c2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}{}", self.from, self.to)
        } else {
            write!(f, "{}", self.notation)
        }
    }
}

/// Parses a move written as two coordinates, like `b0c2` or `b0-c2`.
///
/// # Example
/// ```
/// # use xiangqi::{parse_coordinate_move, Position};
/// let (from, to) = parse_coordinate_move("b0-c2").unwrap();
/// assert_eq!(from, Position::new(9, 1));
/// assert_eq!(to, Position::new(7, 2));
/// assert!(parse_coordinate_move("b0").is_err());
/// ```
pub fn parse_coordinate_move(s: &str) -> Result<(Position, Position)> {
    let trimmed = s.trim();
    let compact = trimmed.replace('-', "");

    if compact.len() != 4 || !compact.is_ascii() {
        bail!("Invalid move {trimmed:?}: expected two coordinates, like `b0c2`");
    }

    let (from, to) = compact.split_at(2);
    let from = from
        .parse::<Position>()
        .with_context(|| format!("Invalid origin in move {trimmed:?}"))?;
    let to = to
        .parse::<Position>()
        .with_context(|| format!("Invalid destination in move {trimmed:?}"))?;

    Ok((from, to))
}
