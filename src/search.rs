/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use clap::ValueEnum;
use log::{info, trace};

use crate::{legal_moves, Board, Color, Evaluator, GamePosition, Move, Position, Score};

/// Maximum depth that can be searched
pub const MAX_DEPTH: usize = 64;

/// How hard the AI tries, expressed as a fixed search depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Difficulty {
    /// Searches 2 plies.
    #[value(alias = "1")]
    Easy,

    /// Searches 4 plies.
    #[default]
    #[value(alias = "2")]
    Medium,

    /// Searches 6 plies.
    #[value(alias = "3")]
    Hard,
}

impl Difficulty {
    /// The number of plies searched at this difficulty.
    #[inline(always)]
    pub const fn depth(&self) -> usize {
        match self {
            Self::Easy => 2,
            Self::Medium => 4,
            Self::Hard => 6,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| anyhow!("Invalid difficulty {s:?}: expected `easy`, `medium`, or `hard`"))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// Only `None` if there were no legal moves to begin with, or the search had no depth.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from the perspective of the side that searched.
    pub score: Score,

    /// How long the search took.
    pub elapsed: Duration,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            elapsed: Duration::ZERO,
        }
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bestmove = self
            .bestmove
            .as_ref()
            .map(|mv| mv.to_string())
            .unwrap_or_else(|| String::from("(none)"));

        write!(
            f,
            "bestmove {bestmove} score {:?} nodes {} time {}ms",
            self.score,
            self.nodes,
            self.elapsed.as_millis()
        )
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: usize,

    /// Whether to skip branches that cannot affect the result.
    ///
    /// Disabling this yields plain minimax, which visits every node and returns the same score.
    pub alpha_beta: bool,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Difficulty::default().into()
    }
}

impl From<Difficulty> for SearchConfig {
    #[inline(always)]
    fn from(difficulty: Difficulty) -> Self {
        Self {
            max_depth: difficulty.depth(),
            alpha_beta: true,
        }
    }
}

/// Executes a depth-limited minimax search with alpha-beta pruning on a private copy of a position.
///
/// Moves are made and unmade in place on that copy, so the caller's position is never touched.
pub struct Search {
    /// The board being searched. Restored after every move is tried.
    board: Board,

    /// The side that searches, from whose perspective every score is given.
    root: Color,

    /// Whether the root position is already over.
    is_terminal: bool,

    /// Number of nodes visited so far.
    nodes: u64,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl Search {
    /// Construct a new [`Search`] instance on a copy of the provided [`GamePosition`].
    #[inline(always)]
    pub fn new(position: &GamePosition, config: SearchConfig) -> Self {
        Self {
            board: *position.board(),
            root: position.side_to_move(),
            is_terminal: position.is_game_over(),
            nodes: 0,
            config,
        }
    }

    /// Start the search, returning its results.
    pub fn start(mut self) -> SearchResult {
        let starttime = Instant::now();
        info!(
            "Starting depth {} search for {} on {:?}",
            self.config.max_depth, self.root, self.board
        );

        let (bestmove, score) = if self.is_terminal {
            // Nothing left to play; the position is its own evaluation
            self.nodes += 1;
            (None, Evaluator::new(&self.board, self.root).eval())
        } else {
            self.minimax(
                self.root,
                self.config.max_depth,
                -Score::INF,
                Score::INF,
                true,
            )
        };

        // Describe the move on the untouched root board
        let bestmove = bestmove.and_then(|(from, to)| {
            let piece = self.board.piece_at(from).copied()?;
            Some(Move::new(piece, to, self.board.piece_at(to).copied()))
        });

        let res = SearchResult {
            nodes: self.nodes,
            bestmove,
            score,
            elapsed: starttime.elapsed(),
        };

        info!("Finished search for {}: {res}", self.root);

        res
    }

    /// Primary location of search logic.
    ///
    /// Uses the [minimax](https://www.chessprogramming.org/Minimax) algorithm with [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta).
    /// Scores are always from the perspective of the root side: the root plies maximize, and the opponent's plies minimize.
    fn minimax(
        &mut self,
        side: Color,
        depth: usize,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> (Option<(Position, Position)>, Score) {
        self.nodes += 1;

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            let score = Evaluator::new(&self.board, side).eval_for(self.root);
            return (None, score);
        }

        let moves = legal_moves(&self.board, side);

        // No legal moves is an immediate loss for whoever is to move
        if moves.is_empty() {
            let score = if maximizing { -Score::INF } else { Score::INF };
            return (None, score);
        }

        // Start with the first move, so there is always something to play
        let mut bestmove = moves.first().copied();
        let mut best = if maximizing { -Score::INF } else { Score::INF };

        for (from, to) in moves {
            let had_moved = self.board.piece_at(from).is_some_and(|piece| piece.has_moved());
            let captured = self.board.relocate(from, to);

            let (_, score) = self.minimax(side.opponent(), depth - 1, alpha, beta, !maximizing);

            self.board.revert(from, to, had_moved, captured);

            if maximizing {
                if score > best {
                    best = score;
                    bestmove = Some((from, to));
                }
                alpha = alpha.max(best);
            } else {
                if score < best {
                    best = score;
                    bestmove = Some((from, to));
                }
                beta = beta.min(best);
            }

            if self.config.alpha_beta && beta <= alpha {
                trace!("Pruned at depth {depth} (beta={beta:?} <= alpha={alpha:?})");
                break;
            }
        }

        (bestmove, best)
    }
}

/// A computer opponent, searching to the depth set by its difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ai {
    config: SearchConfig,
}

impl Ai {
    /// Creates a new [`Ai`] playing at `difficulty`.
    #[inline(always)]
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            config: difficulty.into(),
        }
    }

    /// The configuration used for every search.
    #[inline(always)]
    pub const fn config(&self) -> SearchConfig {
        self.config
    }

    /// Changes the search depth to match `difficulty`. Takes effect on the next search.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.max_depth = difficulty.depth();
        info!("AI difficulty set to {difficulty} (depth: {})", self.config.max_depth);
    }

    /// Sets an explicit search depth, capped at [`MAX_DEPTH`].
    pub fn set_depth(&mut self, depth: usize) {
        self.config.max_depth = depth.min(MAX_DEPTH);
        info!("AI depth set to {}", self.config.max_depth);
    }

    /// Searches `position`, returning the full result.
    #[inline(always)]
    pub fn search(&self, position: &GamePosition) -> SearchResult {
        Search::new(position, self.config).start()
    }

    /// Finds the best move for the side to move in `position`.
    ///
    /// Returns `None` if that side has no legal moves, which means the game is over.
    #[inline(always)]
    pub fn best_move(&self, position: &GamePosition) -> Option<Move> {
        self.search(position).bestmove
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Game, GameStatus};

    fn search(fen: &str, max_depth: usize, alpha_beta: bool) -> SearchResult {
        let position = GamePosition::from_fen(fen).unwrap();
        let config = SearchConfig {
            max_depth,
            alpha_beta,
        };
        Search::new(&position, config).start()
    }

    #[test]
    fn test_difficulty_depths() {
        assert_eq!(Difficulty::Easy.depth(), 2);
        assert_eq!(Difficulty::Medium.depth(), 4);
        assert_eq!(Difficulty::Hard.depth(), 6);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("1".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_set_difficulty_mid_game() {
        let mut ai = Ai::new(Difficulty::Easy);
        assert_eq!(ai.config().max_depth, 2);
        ai.set_difficulty(Difficulty::Hard);
        assert_eq!(ai.config().max_depth, 6);
        ai.set_depth(1000);
        assert_eq!(ai.config().max_depth, MAX_DEPTH);
    }

    #[test]
    fn test_depth_zero_is_static_eval() {
        let position = GamePosition::new();
        let res = search(&position.to_fen(), 0, true);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Evaluator::from_position(&position).eval());
        assert_eq!(res.nodes, 1);
    }

    #[test]
    fn test_pruning_preserves_score() {
        let fen = "4k4/4a4/3a5/9/2c6/6P2/9/2C6/4A4/3K1R3 w";
        let pruned = search(fen, 3, true);
        let full = search(fen, 3, false);

        assert_eq!(pruned.score, full.score);
        assert!(pruned.nodes < full.nodes);
    }

    #[test]
    fn test_red_mate_in_1() {
        let fen = "4k4/R8/9/9/9/8R/p8/9/9/3K5 w";
        let res = search(fen, Difficulty::Easy.depth(), true);
        assert_eq!(res.score, Score::INF);

        let mv = res.bestmove.unwrap();
        let mut game = Game::from_position(GamePosition::from_fen(fen).unwrap());
        assert!(game.make_move(mv.from(), mv.to()));
        assert_eq!(game.position().status(), GameStatus::Checkmate);
        assert_eq!(game.position().winner(), Some(Color::Red));
    }

    #[test]
    fn test_black_mate_in_1() {
        let fen = "3k5/9/9/P8/8r/9/9/9/r8/4K4 b";
        let res = search(fen, Difficulty::Easy.depth(), true);
        assert_eq!(res.score, Score::INF);

        let mv = res.bestmove.unwrap();
        let mut game = Game::from_position(GamePosition::from_fen(fen).unwrap());
        assert!(game.make_move(mv.from(), mv.to()));
        assert_eq!(game.position().status(), GameStatus::Checkmate);
        assert_eq!(game.position().winner(), Some(Color::Black));
    }

    #[test]
    fn test_no_moves_means_no_bestmove() {
        // Black is stalemated
        let res = search("4k4/R8/9/9/9/5R3/9/9/9/3K5 b", 4, true);
        assert!(res.bestmove.is_none());
    }

    #[test]
    fn test_root_in_check_is_searched() {
        // Black is in check from the chariot on e0, and only Ke9f9 escapes
        let res = search("4k4/9/9/9/9/9/9/9/9/3KR4 b", 2, true);
        let mv = res.bestmove.unwrap();
        assert_eq!(mv.notation(), "Ke9f9");
        assert!(res.nodes > 1);
    }

    #[test]
    fn test_losing_side_still_moves() {
        // Black's only move walks into mate, but it must still be played
        let res = search("4k4/R8/9/9/9/9/9/9/9/3K4R b", 3, true);
        assert_eq!(res.score, -Score::INF);
        assert_eq!(res.bestmove.unwrap().to(), Position::new(0, 5));
    }

    #[test]
    fn test_search_leaves_position_untouched() {
        let game = Game::new();
        let before = game.snapshot();
        let ai = Ai::new(Difficulty::Easy);

        let mv = ai.best_move(game.position()).unwrap();
        assert_eq!(game.position(), &before);
        assert!(game.legal_destinations(mv.from()).contains(&mv.to()));
    }
}
