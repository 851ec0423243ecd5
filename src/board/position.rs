/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::Color;

/// Represents a single intersection on a Xiangqi board.
///
/// Row `0` is Black's back rank and row `9` is Red's. Columns run `0..=8` from left to right, as seen from Red's side.
///
/// When printed, a [`Position`] uses a file letter (`a`-`i`) followed by a rank digit, where the rank is `9 - row`.
/// That puts Red's general on `e0` and Black's general on `e9`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Number of rows on the board.
    pub const ROWS: u8 = 10;

    /// Number of columns on the board.
    pub const COLS: u8 = 9;

    /// Number of intersections on the board.
    pub const COUNT: usize = Self::ROWS as usize * Self::COLS as usize;

    /// Last row on Black's side of the river.
    pub const BLACK_RIVERBANK: u8 = 4;

    /// Last row on Red's side of the river.
    pub const RED_RIVERBANK: u8 = 5;

    /// Creates a new [`Position`] from a row and column.
    ///
    /// # Panics
    /// If `row` or `col` are out of bounds and debug assertions are enabled.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Position;
    /// let pos = Position::new(9, 4);
    /// assert_eq!(pos.to_string(), "e0");
    /// ```
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < Self::ROWS && col < Self::COLS);
        Self { row, col }
    }

    /// Creates a new [`Position`] from signed coordinates, if they lie on the board.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Position;
    /// assert!(Position::try_new(0, 8).is_some());
    /// assert!(Position::try_new(10, 0).is_none());
    /// assert!(Position::try_new(0, -1).is_none());
    /// ```
    #[inline(always)]
    pub const fn try_new(row: i8, col: i8) -> Option<Self> {
        if is_in_bounds(row, col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Creates a new [`Position`] from an index in `0..90`, counted row by row from the top-left.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        Self::new((index / Self::COLS as usize) as u8, (index % Self::COLS as usize) as u8)
    }

    /// Returns this [`Position`]'s index in `0..90`, counted row by row from the top-left.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.row as usize * Self::COLS as usize + self.col as usize
    }

    /// The row of this [`Position`].
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// The column of this [`Position`].
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// An iterator over every [`Position`] on the board, row by row from Black's back rank.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT).map(Self::from_index)
    }

    /// Shifts this [`Position`] by the provided deltas, if the result is still on the board.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Position;
    /// let pos = Position::new(9, 4);
    /// assert_eq!(pos.offset(-1, 0), Some(Position::new(8, 4)));
    /// assert_eq!(pos.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, row_delta: i8, col_delta: i8) -> Option<Self> {
        Self::try_new(self.row as i8 + row_delta, self.col as i8 + col_delta)
    }

    /// Mirrors this [`Position`] vertically, swapping the two halves of the board.
    #[inline(always)]
    pub const fn flipped(&self) -> Self {
        Self::new(Self::ROWS - 1 - self.row, self.col)
    }

    /// If `color` is Red, does nothing.
    /// If `color` is Black, flips `self` vertically.
    ///
    /// Useful for looking up tables written from Red's side of the board.
    #[inline(always)]
    pub const fn relative_to(&self, color: Color) -> Self {
        match color {
            Color::Red => *self,
            Color::Black => self.flipped(),
        }
    }

    /// Returns `true` if this [`Position`] is inside `color`'s palace.
    ///
    /// The palace is the 3x3 zone on columns `3..=5`, spanning rows `7..=9` for Red and `0..=2` for Black.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Color, Position};
    /// assert!(Position::new(8, 4).is_in_palace(Color::Red));
    /// assert!(!Position::new(8, 4).is_in_palace(Color::Black));
    /// assert!(!Position::new(9, 2).is_in_palace(Color::Red));
    /// ```
    #[inline(always)]
    pub const fn is_in_palace(&self, color: Color) -> bool {
        let rows_ok = match color {
            Color::Red => self.row >= 7,
            Color::Black => self.row <= 2,
        };

        rows_ok && self.col >= 3 && self.col <= 5
    }

    /// Returns `true` if this [`Position`] is on `color`'s own side of the river.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Color, Position};
    /// assert!(Position::new(5, 0).is_on_own_side(Color::Red));
    /// assert!(!Position::new(4, 0).is_on_own_side(Color::Red));
    /// assert!(Position::new(4, 0).is_on_own_side(Color::Black));
    /// ```
    #[inline(always)]
    pub const fn is_on_own_side(&self, color: Color) -> bool {
        match color {
            Color::Red => self.row >= Self::RED_RIVERBANK,
            Color::Black => self.row <= Self::BLACK_RIVERBANK,
        }
    }

    /// Manhattan distance between two positions.
    #[inline(always)]
    pub const fn distance(&self, other: Self) -> u8 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The file letter of this [`Position`], from `a` (column 0) to `i` (column 8).
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// The rank digit of this [`Position`], which is `9 - row`.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'0' + (Self::ROWS - 1 - self.row)) as char
    }

    /// Parses a [`Position`] from a file letter and a rank digit, like `e0`.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::Position;
    /// assert_eq!(Position::from_notation("a9").unwrap(), Position::new(0, 0));
    /// assert_eq!(Position::from_notation("I0").unwrap(), Position::new(9, 8));
    /// assert!(Position::from_notation("j0").is_err());
    /// ```
    pub fn from_notation(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid coordinate {s:?}: expected a file letter followed by a rank digit");
        };

        let file = file.to_ascii_lowercase();
        if !('a'..='i').contains(&file) {
            bail!("Invalid file {file:?} in coordinate {s:?}: must be between [a,i]");
        }

        let rank = rank
            .to_digit(10)
            .ok_or_else(|| anyhow!("Invalid rank {rank:?} in coordinate {s:?}: must be between [0,9]"))?;

        Ok(Self::new(
            Self::ROWS - 1 - rank as u8,
            file as u8 - b'a',
        ))
    }

    /// Converts this [`Position`] into its file-rank notation, like `e0`.
    #[inline(always)]
    pub fn to_notation(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

/// Returns `true` if the signed coordinates lie on the board.
#[inline(always)]
pub const fn is_in_bounds(row: i8, col: i8) -> bool {
    row >= 0 && row < Position::ROWS as i8 && col >= 0 && col < Position::COLS as i8
}

impl FromStr for Position {
    type Err = anyhow::Error;
    /// Wrapper for [`Position::from_notation`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_notation(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Position {
    /// Displays the notation alongside the raw row and column.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self, self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_roundtrips_every_position() {
        for pos in Position::iter() {
            assert_eq!(Position::from_notation(&pos.to_notation()).unwrap(), pos);
        }
    }

    #[test]
    fn test_palace_has_nine_points_per_color() {
        for color in Color::all() {
            let count = Position::iter().filter(|p| p.is_in_palace(color)).count();
            assert_eq!(count, 9, "{color} palace");
        }
    }

    #[test]
    fn test_river_splits_board_in_half() {
        for pos in Position::iter() {
            assert_ne!(
                pos.is_on_own_side(Color::Red),
                pos.is_on_own_side(Color::Black),
                "{pos:?} must be on exactly one side"
            );
        }
    }

    #[test]
    fn test_offset_rejects_out_of_bounds() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(9, 8), Some(Position::new(9, 8)));
        assert_eq!(corner.offset(10, 0), None);
    }

    #[test]
    fn test_relative_to_black_flips_rows() {
        let pos = Position::new(7, 1);
        assert_eq!(pos.relative_to(Color::Red), pos);
        assert_eq!(pos.relative_to(Color::Black), Position::new(2, 1));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(Position::from_notation("").is_err());
        assert!(Position::from_notation("e").is_err());
        assert!(Position::from_notation("e10").is_err());
        assert!(Position::from_notation("ex").is_err());
    }
}
