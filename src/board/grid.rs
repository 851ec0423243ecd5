/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::{Color, Piece, PieceId, PieceKind, Position};

/// FEN placement string for the standard starting layout of Xiangqi.
pub const FEN_PLACEMENT_STARTPOS: &str =
    "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";

/// Maximum number of pieces a [`Board`] can hold: 16 per side.
pub const MAX_PIECES: usize = 32;

/// Layout of one side's pieces in the starting position, from Red's side of the board.
const STARTING_LAYOUT: [(PieceKind, [(u8, u8); 5], usize); 7] = [
    (PieceKind::Chariot, [(9, 0), (9, 8), (0, 0), (0, 0), (0, 0)], 2),
    (PieceKind::Horse, [(9, 1), (9, 7), (0, 0), (0, 0), (0, 0)], 2),
    (PieceKind::Elephant, [(9, 2), (9, 6), (0, 0), (0, 0), (0, 0)], 2),
    (PieceKind::Advisor, [(9, 3), (9, 5), (0, 0), (0, 0), (0, 0)], 2),
    (PieceKind::General, [(9, 4), (0, 0), (0, 0), (0, 0), (0, 0)], 1),
    (PieceKind::Cannon, [(7, 1), (7, 7), (0, 0), (0, 0), (0, 0)], 2),
    (PieceKind::Soldier, [(6, 0), (6, 2), (6, 4), (6, 6), (6, 8)], 5),
];

/// The physical state of a Xiangqi board.
///
/// Pieces live in a fixed arena of [`MAX_PIECES`] slots indexed by [`PieceId`].
/// The 10x9 grid stores only the id of the piece on each intersection.
/// Both are only ever mutated together, which upholds the following invariant:
/// for every live piece, the grid cell at its position holds its id,
/// and every non-empty grid cell refers to exactly one live piece.
///
/// Captured pieces keep their slot (emptied), so restoring them on undo puts them back under the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    grid: [Option<PieceId>; Position::COUNT],
    pieces: [Option<Piece>; MAX_PIECES],
    len: u8,
}

impl Board {
    /// Creates an empty [`Board`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            grid: [None; Position::COUNT],
            pieces: [None; MAX_PIECES],
            len: 0,
        }
    }

    /// Creates a [`Board`] with the standard 32-piece starting layout.
    ///
    /// Red's pieces occupy the first 16 ids, followed by Black's.
    pub fn standard() -> Self {
        let mut board = Self::new();

        for color in Color::all() {
            for (kind, squares, count) in STARTING_LAYOUT {
                for &(row, col) in &squares[..count] {
                    let pos = Position::new(row, col).relative_to(color);
                    board.push(kind, color, pos);
                }
            }
        }

        board
    }

    /// Places a new piece on the board, returning its id.
    ///
    /// Fails if `position` is already occupied, the arena is full, or `color` already has a general and `kind` is one.
    pub fn place(&mut self, kind: PieceKind, color: Color, position: Position) -> Result<PieceId> {
        if let Some(occupant) = self.piece_at(position) {
            bail!("Cannot place {color} {kind} on {position}: occupied by {occupant}");
        }

        if kind == PieceKind::General && self.general(color).is_some() {
            bail!("Cannot place {color} {kind} on {position}: {color} already has a general");
        }

        if self.len as usize >= MAX_PIECES {
            bail!("Cannot place {color} {kind} on {position}: a board holds at most {MAX_PIECES} pieces");
        }

        Ok(self.push(kind, color, position))
    }

    /// Appends a piece to the arena without validation.
    #[inline(always)]
    fn push(&mut self, kind: PieceKind, color: Color, position: Position) -> PieceId {
        let id = PieceId(self.len);
        self.pieces[id.index()] = Some(Piece::new(id, kind, color, position));
        self.grid[position.index()] = Some(id);
        self.len += 1;
        id
    }

    /// Fetches the piece on `position`, if there is one.
    #[inline(always)]
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.grid[position.index()].and_then(|id| self.piece(id))
    }

    /// Fetches the live piece with the provided id, if it has not been captured.
    #[inline(always)]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns `true` if there is a piece on `position`.
    #[inline(always)]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.grid[position.index()].is_some()
    }

    /// Fetches the color of the piece on `position`, if there is one.
    #[inline(always)]
    pub fn color_at(&self, position: Position) -> Option<Color> {
        self.piece_at(position).map(Piece::color)
    }

    /// An iterator over every live piece, in id order.
    #[inline(always)]
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().flatten()
    }

    /// An iterator over every live piece of `color`, in id order.
    #[inline(always)]
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |piece| piece.color() == color)
    }

    /// Number of live pieces on the board.
    #[inline(always)]
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Fetches `color`'s general, if it is on the board.
    #[inline(always)]
    pub fn general(&self, color: Color) -> Option<&Piece> {
        self.pieces_of(color).find(|piece| piece.is_general())
    }

    /// Moves the piece on `from` to `to`, removing whatever stood on `to`.
    ///
    /// The mover is marked as moved. Returns a snapshot of the captured piece, if any.
    ///
    /// # Panics
    /// If there is no piece on `from`.
    pub fn relocate(&mut self, from: Position, to: Position) -> Option<Piece> {
        let id = self.grid[from.index()].expect("relocate requires a piece on the origin");

        let captured = self.grid[to.index()].and_then(|victim| self.pieces[victim.index()].take());

        self.grid[from.index()] = None;
        self.grid[to.index()] = Some(id);
        if let Some(piece) = self.pieces[id.index()].as_mut() {
            piece.relocate(to);
        }

        captured
    }

    /// Reverts a [`Board::relocate`] from `from` to `to`.
    ///
    /// The mover returns to `from` with its prior moved flag, and `captured` (if any) is restored to `to` under its original id.
    ///
    /// # Panics
    /// If there is no piece on `to`.
    pub fn revert(&mut self, from: Position, to: Position, had_moved: bool, captured: Option<Piece>) {
        let id = self.grid[to.index()].expect("revert requires a piece on the destination");

        self.grid[to.index()] = None;
        self.grid[from.index()] = Some(id);
        if let Some(piece) = self.pieces[id.index()].as_mut() {
            piece.restore(from, had_moved);
        }

        if let Some(victim) = captured {
            self.grid[to.index()] = Some(victim.id());
            self.pieces[victim.id().index()] = Some(victim);
        }
    }

    /// Returns a copy of this board with the piece on `from` moved to `to`.
    #[inline(always)]
    pub fn with_move_made(&self, from: Position, to: Position) -> Self {
        let mut copy = *self;
        copy.relocate(from, to);
        copy
    }

    /// Returns `true` if the grid and the piece arena agree with each other.
    pub fn is_consistent(&self) -> bool {
        let pieces_match_grid = self
            .pieces
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|piece| (i, piece)))
            .all(|(i, piece)| {
                piece.id().index() == i && self.grid[piece.position().index()] == Some(piece.id())
            });

        let grid_matches_pieces = Position::iter().all(|pos| match self.grid[pos.index()] {
            Some(id) => self.piece(id).is_some_and(|piece| piece.position() == pos),
            None => true,
        });

        pieces_match_grid && grid_matches_pieces
    }

    /// Parses the placement field of a FEN string, row 0 first.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, FEN_PLACEMENT_STARTPOS};
    /// let board = Board::from_fen(FEN_PLACEMENT_STARTPOS).unwrap();
    /// assert_eq!(board.piece_count(), 32);
    /// assert_eq!(board.to_fen(), Board::standard().to_fen());
    /// ```
    pub fn from_fen(placement: &str) -> Result<Self> {
        let mut board = Self::new();
        let rows = placement.trim().split('/').collect::<Vec<_>>();

        if rows.len() != Position::ROWS as usize {
            bail!(
                "Invalid FEN placement {placement:?}: expected {} rows, got {}",
                Position::ROWS,
                rows.len()
            );
        }

        for (row, contents) in rows.into_iter().enumerate() {
            let mut col = 0u8;
            for c in contents.chars() {
                if let Some(empty) = c.to_digit(10) {
                    col += empty as u8;
                    if col > Position::COLS {
                        bail!("Invalid FEN row {contents:?}: more than {} columns", Position::COLS);
                    }
                } else {
                    if col >= Position::COLS {
                        bail!("Invalid FEN row {contents:?}: more than {} columns", Position::COLS);
                    }
                    let kind = PieceKind::from_fen_char(c)
                        .map_err(|e| anyhow!("Invalid FEN row {contents:?}: {e}"))?;
                    let color = if c.is_ascii_uppercase() {
                        Color::Red
                    } else {
                        Color::Black
                    };
                    board.place(kind, color, Position::new(row as u8, col))?;
                    col += 1;
                }
            }

            if col != Position::COLS {
                bail!(
                    "Invalid FEN row {contents:?}: expected {} columns, got {col}",
                    Position::COLS
                );
            }
        }

        Ok(board)
    }

    /// Generates the placement field of a FEN string for this board.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for row in 0..Position::ROWS {
            let mut empty = 0;
            for col in 0..Position::COLS {
                if let Some(piece) = self.piece_at(Position::new(row, col)) {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.char());
                } else {
                    empty += 1;
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row + 1 < Position::ROWS {
                fen.push('/');
            }
        }

        fen
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..Position::ROWS {
            write!(f, "{}|", Position::ROWS - 1 - row)?;
            for col in 0..Position::COLS {
                let piece = self.piece_at(Position::new(row, col));
                write!(f, " {}", piece.map(Piece::char).unwrap_or('.'))?;
            }
            writeln!(f)?;

            // The river
            if row == Position::BLACK_RIVERBANK {
                writeln!(f, " |{}", " ~".repeat(Position::COLS as usize))?;
            }
        }

        write!(f, " +")?;
        for _ in 0..Position::COLS {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for col in 0..Position::COLS {
            write!(f, "{} ", (b'a' + col) as char)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let board = Board::standard();
        assert_eq!(board.piece_count(), 32);
        assert!(board.is_consistent());

        for color in Color::all() {
            assert_eq!(board.pieces_of(color).count(), 16);
            let general = board.general(color).unwrap();
            assert_eq!(general.position(), Position::new(9, 4).relative_to(color));
        }

        assert_eq!(board.to_fen(), FEN_PLACEMENT_STARTPOS);
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut board = Board::new();
        let pos = Position::new(4, 4);
        board.place(PieceKind::Horse, Color::Red, pos).unwrap();
        assert!(board.place(PieceKind::Cannon, Color::Black, pos).is_err());
        assert_eq!(board.piece_count(), 1);
    }

    #[test]
    fn test_place_rejects_second_general() {
        let mut board = Board::new();
        board
            .place(PieceKind::General, Color::Red, Position::new(9, 4))
            .unwrap();
        board
            .place(PieceKind::General, Color::Black, Position::new(0, 4))
            .unwrap();
        assert!(board
            .place(PieceKind::General, Color::Red, Position::new(8, 4))
            .is_err());
        assert_eq!(board.piece_count(), 2);

        assert!(Board::from_fen("3kk4/9/9/9/9/9/9/9/9/4K4").is_err());
    }

    #[test]
    fn test_relocate_and_revert_capture() {
        let mut board = Board::from_fen("4k4/9/9/9/9/4r4/9/9/9/4R4").unwrap();
        let original = board;
        let from = Position::new(9, 4);
        let to = Position::new(5, 4);

        let captured = board.relocate(from, to).unwrap();
        assert_eq!(captured.kind(), PieceKind::Chariot);
        assert_eq!(captured.color(), Color::Black);
        assert_eq!(board.piece_count(), 2);
        assert!(board.piece_at(to).unwrap().has_moved());
        assert!(board.is_consistent());

        board.revert(from, to, false, Some(captured));
        assert_eq!(board, original);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_with_move_made_leaves_original_untouched() {
        let board = Board::standard();
        let moved = board.with_move_made(Position::new(9, 1), Position::new(7, 2));
        assert_ne!(board, moved);
        assert!(board.is_occupied(Position::new(9, 1)));
        assert!(!moved.is_occupied(Position::new(9, 1)));
    }

    #[test]
    fn test_invalid_fens() {
        // Too few rows
        assert!(Board::from_fen("9/9/9").is_err());
        // A row that is too long
        assert!(Board::from_fen("rnbakabnrr/9/9/9/9/9/9/9/9/9").is_err());
        // A row that is too short
        assert!(Board::from_fen("8/9/9/9/9/9/9/9/9/9").is_err());
        // Unknown piece
        assert!(Board::from_fen("q8/9/9/9/9/9/9/9/9/9").is_err());
        // A long run of empty squares
        let fen = format!("{}/9/9/9/9/9/9/9/9/9", "9".repeat(30));
        assert!(Board::from_fen(&fen).is_err());
        assert!(Board::from_fen("55/9/9/9/9/9/9/9/9/9").is_err());
    }
}
