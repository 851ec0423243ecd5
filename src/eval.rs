/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{legal_moves, Board, Color, GamePosition, Piece, PieceKind, Position, Psqt, Score};

/// Value of each legal move the side to move has over its opponent.
const MOBILITY_WEIGHT: i32 = 10;

/// Value of each friendly piece near a general.
const DEFENDER_WEIGHT: i32 = 25;

/// Largest Manhattan distance from the general at which a piece counts as a defender.
const DEFENDER_RADIUS: u8 = 2;

/// Penalty for a horse, cannon, or chariot still on its starting point.
const UNDEVELOPED_PENALTY: i32 = -20;

/// Bonus for a horse, cannon, or chariot that has left its starting point.
const DEVELOPED_BONUS: i32 = 30;

/// Starting points of the pieces that are rewarded for developing, from Red's side of the board.
const DEVELOPMENT_SQUARES: [(PieceKind, [Position; 2]); 3] = [
    (PieceKind::Horse, [Position::new(9, 1), Position::new(9, 7)]),
    (PieceKind::Cannon, [Position::new(7, 1), Position::new(7, 7)]),
    (PieceKind::Chariot, [Position::new(9, 0), Position::new(9, 8)]),
];

/// The individual terms of an evaluation, each from Red's perspective.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct EvalTerms {
    pub material: Score,
    pub positional: Score,
    pub mobility: Score,
    pub king_safety: Score,
    pub development: Score,
}

impl EvalTerms {
    /// Sum of every term.
    #[inline(always)]
    pub fn total(&self) -> Score {
        self.material + self.positional + self.mobility + self.king_safety + self.development
    }
}

/// Encapsulates the logic of scoring a Xiangqi position.
///
/// Internally, a high score is good for Red, and a low score is good for Black.
/// Scores handed out are relative to a chosen perspective, so that a search can evaluate on behalf of whichever side it plays.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The board to evaluate.
    board: &'a Board,

    /// The side whose turn it is, which the mobility term favors.
    side_to_move: Color,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for a board with `side_to_move` to play.
    #[inline(always)]
    pub const fn new(board: &'a Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
        }
    }

    /// Construct a new [`Evaluator`] for the board and side to move of `position`.
    #[inline(always)]
    pub const fn from_position(position: &'a GamePosition) -> Self {
        Self::new(position.board(), position.side_to_move())
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    /// A score of 0 is considered equal.
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.eval_for(self.side_to_move)
    }

    /// Evaluate this position from `color`'s perspective.
    ///
    /// A positive/high number is good for the `color`, while a negative number is better for the opponent.
    /// A score of 0 is considered equal.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Board, Color, Evaluator, Score};
    /// let board = Board::standard();
    /// let eval = Evaluator::new(&board, Color::Red);
    /// assert_eq!(eval.eval_for(Color::Red), Score::DRAW);
    /// ```
    #[inline(always)]
    pub fn eval_for(&self, color: Color) -> Score {
        self.terms().total() * color.negation_multiplier()
    }

    /// Computes every term of the evaluation, from Red's perspective.
    pub fn terms(&self) -> EvalTerms {
        EvalTerms {
            material: self.material(),
            positional: self.positional(),
            mobility: self.mobility(),
            king_safety: self.king_safety(),
            development: self.development(),
        }
    }

    /// Sum of piece values, positive for Red's pieces and negative for Black's.
    fn material(&self) -> Score {
        self.board
            .pieces()
            .map(|piece| Score(value_of(piece.kind()) * piece.color().negation_multiplier()))
            .sum()
    }

    /// Sum of piece-square table values.
    fn positional(&self) -> Score {
        self.board
            .pieces()
            .map(|piece| Score(Psqt::eval(piece) * piece.color().negation_multiplier()))
            .sum()
    }

    /// Difference in legal move counts, in favor of the side to move.
    fn mobility(&self) -> Score {
        let stm = self.side_to_move;
        let ours = legal_moves(self.board, stm).len() as i32;
        let theirs = legal_moves(self.board, stm.opponent()).len() as i32;

        Score((ours - theirs) * MOBILITY_WEIGHT * stm.negation_multiplier())
    }

    /// Friendly pieces close to each general.
    fn king_safety(&self) -> Score {
        Color::all()
            .into_iter()
            .filter_map(|color| self.board.general(color))
            .map(|general| {
                let defenders = self
                    .board
                    .pieces_of(general.color())
                    .filter(|piece| {
                        piece.id() != general.id()
                            && piece.position().distance(general.position()) <= DEFENDER_RADIUS
                    })
                    .count() as i32;

                Score(defenders * DEFENDER_WEIGHT * general.color().negation_multiplier())
            })
            .sum()
    }

    /// Horses, cannons, and chariots that have left their starting points.
    fn development(&self) -> Score {
        self.board
            .pieces()
            .filter_map(|piece| {
                let (_, starts) = DEVELOPMENT_SQUARES
                    .iter()
                    .find(|(kind, _)| *kind == piece.kind())?;

                let pos = piece.position().relative_to(piece.color());
                let value = if starts.contains(&pos) {
                    UNDEVELOPED_PENALTY
                } else {
                    DEVELOPED_BONUS
                };

                Some(Score(value * piece.color().negation_multiplier()))
            })
            .sum()
    }

    /// Material and positional value of `piece`, from Red's perspective.
    ///
    /// Only used when printing the evaluator
    #[inline(always)]
    fn value_of_piece(piece: &Piece) -> Score {
        Score((value_of(piece.kind()) + Psqt::eval(piece)) * piece.color().negation_multiplier())
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = self.side_to_move;
        let files = 0..Position::COLS;

        fn divider(f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "  +")?;
            for _ in 0..Position::COLS {
                write!(f, "------+")?;
            }
            writeln!(f)
        }

        divider(f)?;
        for row in 0..Position::ROWS {
            write!(f, "{} |", Position::ROWS - 1 - row)?;

            // Step 1: Write the piece char
            for col in files.clone() {
                let piece = self.board.piece_at(Position::new(row, col));
                let piece_char = piece.map(Piece::char).unwrap_or(' ');
                write!(f, "  {piece_char}   |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for col in files.clone() {
                let score = match self.board.piece_at(Position::new(row, col)) {
                    Some(piece) => {
                        let val = Self::value_of_piece(piece);
                        let s = if val > Score::DRAW {
                            format!("+{}", val.normalize())
                        } else {
                            format!("{}", val.normalize())
                        };
                        format!("{s:^6}")
                    }
                    None => String::from("      "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            divider(f)?;
        }
        for col in files {
            write!(f, "      {}", (b'a' + col) as char)?;
        }

        let terms = self.terms();
        writeln!(f, "\n\n{:<12} {:>8}", "Term", "Red")?;
        writeln!(f, "{:<12} {:>8}", "Material", terms.material)?;
        writeln!(f, "{:<12} {:>8}", "Positional", terms.positional)?;
        writeln!(f, "{:<12} {:>8}", "Mobility", terms.mobility)?;
        writeln!(f, "{:<12} {:>8}", "King safety", terms.king_safety)?;
        writeln!(f, "{:<12} {:>8}", "Development", terms.development)?;

        let score = terms.total() * color.negation_multiplier();

        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(color.opponent())
        } else {
            None
        };

        writeln!(
            f,
            "\nWinning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        writeln!(f, "Score ({color}): {score}")?;

        Ok(())
    }
}

/// Returns the material value of the provided [`PieceKind`].
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::General => 10_000,
        PieceKind::Advisor => 200,
        PieceKind::Elephant => 200,
        PieceKind::Horse => 400,
        PieceKind::Chariot => 900,
        PieceKind::Cannon => 450,
        PieceKind::Soldier => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_fen(fen: &str) -> Score {
        let position = GamePosition::from_fen(fen).unwrap();
        Evaluator::from_position(&position).eval()
    }

    #[test]
    fn test_startpos_is_balanced() {
        let board = Board::standard();
        for color in Color::all() {
            let eval = Evaluator::new(&board, color);
            assert_eq!(eval.terms(), EvalTerms::default());
            assert_eq!(eval.eval(), Score::DRAW);
        }
    }

    #[test]
    fn test_perspectives_are_opposite() {
        let position = GamePosition::from_fen(
            "r1bakab1r/9/1cn4cn/p1p1p3p/6p2/2P6/P3P1P1P/1CN3NC1/9/R1BAKAB1R b",
        )
        .unwrap();
        let eval = Evaluator::from_position(&position);
        assert_eq!(eval.eval_for(Color::Red), -eval.eval_for(Color::Black));
        assert_eq!(eval.eval(), eval.eval_for(Color::Black));
    }

    #[test]
    fn test_extra_chariot_is_good() {
        // Red has both chariots, Black is missing one
        let score = eval_fen("1nbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w");
        assert!(score > value_of(PieceKind::Chariot) / 2, "{score:?}");

        let score = eval_fen("1nbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR b");
        assert!(score < -value_of(PieceKind::Chariot) / 2, "{score:?}");
    }

    #[test]
    fn test_development_rewards_moved_pieces() {
        let board = Board::standard().with_move_made(Position::new(9, 1), Position::new(7, 2));
        let eval = Evaluator::new(&board, Color::Black);
        assert_eq!(
            eval.terms().development,
            Score(DEVELOPED_BONUS - UNDEVELOPED_PENALTY)
        );
    }

    #[test]
    fn test_king_safety_counts_nearby_defenders() {
        // Red general with two advisors beside it, Black general alone
        let board = Board::from_fen("4k4/9/9/9/9/9/9/9/9/3AKA3").unwrap();
        let eval = Evaluator::new(&board, Color::Red);
        assert_eq!(eval.terms().king_safety, Score(2 * DEFENDER_WEIGHT));
    }
}
