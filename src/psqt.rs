/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Piece, PieceKind, Position};

// Every table is written from Red's side of the board: row 0 (top) is Black's back rank, row 9 (bottom) is Red's.

#[rustfmt::skip]
const GENERAL: Psqt = Psqt::new([
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,  50, 100,  50,   0,   0,   0],
    [  0,   0,   0, 100, 200, 100,   0,   0,   0],
    [  0,   0,   0, 200, 300, 200,   0,   0,   0],
]);

#[rustfmt::skip]
const ADVISOR: Psqt = Psqt::new([
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,  50,   0,   0,   0,   0],
    [  0,   0,   0, 100,   0, 100,   0,   0,   0],
    [  0,   0,   0,   0, 150,   0,   0,   0,   0],
]);

#[rustfmt::skip]
const ELEPHANT: Psqt = Psqt::new([
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [ 40,   0, 100,   0, 120,   0, 100,   0,  40],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [ 20,   0,  60,   0,  80,   0,  60,   0,  20],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,  20,   0,  40,   0,  20,   0,   0],
]);

#[rustfmt::skip]
const HORSE: Psqt = Psqt::new([
    [  5,  10,  15,  20,  25,  20,  15,  10,   5],
    [ 10,  20,  30,  40,  50,  40,  30,  20,  10],
    [ 20,  40,  60,  80, 100,  80,  60,  40,  20],
    [ 30,  60,  90, 120, 150, 120,  90,  60,  30],
    [ 40,  80, 120, 150, 180, 150, 120,  80,  40],
    [ 50, 100, 150, 180, 200, 180, 150, 100,  50],
    [ 40,  80, 120, 150, 180, 150, 120,  80,  40],
    [ 30,  60,  90, 120, 150, 120,  90,  60,  30],
    [ 20,  40,  60,  80, 100,  80,  60,  40,  20],
    [ 10,  20,  30,  40,  50,  40,  30,  20,  10],
]);

#[rustfmt::skip]
const CHARIOT: Psqt = Psqt::new([
    [ 40,  50,  60,  70,  80,  70,  60,  50,  40],
    [ 50,  60,  70,  80,  90,  80,  70,  60,  50],
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60],
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70],
    [ 80,  90, 100, 110, 120, 110, 100,  90,  80],
    [ 90, 100, 110, 120, 130, 120, 110, 100,  90],
    [ 80,  90, 100, 110, 120, 110, 100,  90,  80],
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70],
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60],
    [ 50,  60,  70,  80,  90,  80,  70,  60,  50],
]);

#[rustfmt::skip]
const CANNON: Psqt = Psqt::new([
    [ 30,  40,  50,  60,  70,  60,  50,  40,  30],
    [ 40,  50,  60,  70,  80,  70,  60,  50,  40],
    [ 50,  60,  70,  80,  90,  80,  70,  60,  50],
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60],
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70],
    [ 80,  90, 100, 110, 120, 110, 100,  90,  80],
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70],
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60],
    [ 50,  60,  70,  80,  90,  80,  70,  60,  50],
    [ 40,  50,  60,  70,  80,  70,  60,  50,  40],
]);

#[rustfmt::skip]
const SOLDIER: Psqt = Psqt::new([
    [ 90, 100, 110, 120, 130, 120, 110, 100,  90],
    [ 80,  90, 100, 110, 120, 110, 100,  90,  80],
    [ 70,  80,  90, 100, 110, 100,  90,  80,  70],
    [ 60,  70,  80,  90, 100,  90,  80,  70,  60],
    [ 50,  60,  70,  80,  90,  80,  70,  60,  50],
    [ 30,  35,  40,  45,  50,  45,  40,  35,  30],
    [ 25,  30,  35,  40,  45,  40,  35,  30,  25],
    [ 20,  25,  30,  35,  40,  35,  30,  25,  20],
    [ 15,  20,  25,  30,  35,  30,  25,  20,  15],
    [ 10,  15,  20,  25,  30,  25,  20,  15,  10],
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
#[derive(Debug)]
pub struct Psqt([i32; Position::COUNT]);

impl Psqt {
    /// Fetch the Piece-Square Table value for `piece` where it currently stands.
    ///
    /// Black's pieces read the table upside down.
    #[inline(always)]
    pub fn eval(piece: &Piece) -> i32 {
        Self::get_table_for(piece.kind()).get(piece.position().relative_to(piece.color()))
    }

    /// Fetch the Piece-Square Table for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_table_for<'a>(kind: PieceKind) -> &'a Self {
        match kind {
            PieceKind::General => &GENERAL,
            PieceKind::Advisor => &ADVISOR,
            PieceKind::Elephant => &ELEPHANT,
            PieceKind::Horse => &HORSE,
            PieceKind::Chariot => &CHARIOT,
            PieceKind::Cannon => &CANNON,
            PieceKind::Soldier => &SOLDIER,
        }
    }

    /// Creates a new [`Psqt`] from rows of values, row 0 first.
    const fn new(rows: [[i32; Position::COLS as usize]; Position::ROWS as usize]) -> Self {
        let mut flat = [0; Position::COUNT];

        let mut i = 0;
        while i < flat.len() {
            flat[i] = rows[i / Position::COLS as usize][i % Position::COLS as usize];
            i += 1;
        }

        Self(flat)
    }

    /// Get the value of this PSQT at the provided position, as seen from Red's side.
    #[inline(always)]
    pub const fn get(&self, position: Position) -> i32 {
        self.0[position.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Color};

    #[test]
    fn test_eval_is_correct_for_colors() {
        // Over every possible position
        for pos in Position::iter() {
            // For every piece
            for kind in PieceKind::all() {
                let mut red_board = Board::new();
                let red = red_board.place(kind, Color::Red, pos).unwrap();

                let mut black_board = Board::new();
                let black = black_board
                    .place(kind, Color::Black, pos.flipped())
                    .unwrap();

                // Red's PSQT eval is equal to Black's mirrored PSQT eval
                let red = Psqt::eval(red_board.piece(red).unwrap());
                let black = Psqt::eval(black_board.piece(black).unwrap());
                assert_eq!(red, black, "{kind} on {pos}: {red} (red) != {black} (black)");
            }
        }
    }

    #[test]
    fn test_soldiers_prefer_enemy_territory() {
        let home = SOLDIER.get(Position::new(6, 4));
        let across = SOLDIER.get(Position::new(4, 4));
        assert!(across > home);
    }
}
