/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{Color, Difficulty, Position};

/// Command-line arguments for the engine binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// How many plies the AI searches: easy (2), medium (4), or hard (6).
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,

    /// Start from this position instead of the standard layout.
    #[arg(short, long)]
    pub fen: Option<String>,

    /// Let the AI play this side automatically.
    #[arg(long)]
    pub ai: Option<Color>,
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Clear the current selection.
    Clear,

    /// Display the current AI difficulty, or change it.
    Difficulty {
        /// The difficulty to switch to.
        #[arg(value_enum)]
        level: Option<Difficulty>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, every term of the evaluation will be printed beside the board.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Search the current position on a background thread, printing the best move when done.
    Go {
        /// Override the depth set by the difficulty.
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Print every move made so far.
    History,

    /// Apply the provided move to the game, if it is legal.
    ///
    /// Accepts `b0 c2`, `b0c2`, or `b0-c2`.
    Move {
        #[arg(required = true, num_args = 1..=2)]
        squares: Vec<String>,
    },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves { square: Option<Position> },

    /// Start a new game from the standard starting layout.
    NewGame,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Set the position to the provided FEN string, or the starting layout if none is given.
    Position { fen: Vec<String> },

    /// Select the piece on the provided square and show where it can go.
    Select { square: Position },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print the status of the game.
    Status,

    /// Take back the last move.
    Undo,

    /// Await the current search, blocking until it completes.
    Wait {
        /// If set, the move found by the search will be played.
        #[arg(short, long, default_value = "false")]
        play: bool,
    },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!("d".parse(), Ok(EngineCommand::Display)));
        assert!(matches!("quit".parse(), Ok(EngineCommand::Exit)));
        assert!(matches!("newgame".parse(), Ok(EngineCommand::NewGame)));

        let Ok(EngineCommand::Move { squares }) = "move b0 c2".parse() else {
            panic!("failed to parse a two-square move");
        };
        assert_eq!(squares, ["b0", "c2"]);

        let Ok(EngineCommand::Difficulty { level }) = "difficulty 3".parse() else {
            panic!("failed to parse a difficulty alias");
        };
        assert_eq!(level, Some(Difficulty::Hard));

        let Ok(EngineCommand::Go { depth }) = "go -d 3".parse() else {
            panic!("failed to parse a depth override");
        };
        assert_eq!(depth, Some(3));

        assert!("select z9".parse::<EngineCommand>().is_err());
        assert!("move".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_parse_cli() {
        let cli = Cli::try_parse_from(["xiangqi", "--difficulty", "easy", "--ai", "black"]).unwrap();
        assert_eq!(cli.difficulty, Difficulty::Easy);
        assert_eq!(cli.ai, Some(Color::Black));
        assert!(cli.fen.is_none());
    }
}
