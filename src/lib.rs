/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Positions, pieces, the board itself, and move generation.
mod board;

/// Command-line arguments and the commands understood by the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of Xiangqi positions.
mod eval;

/// The rules of the game: turns, moves, and how a game ends.
mod game;

/// Piece-Square Tables.
mod psqt;

/// Numerical scores of positions.
mod score;

/// Main AI logic; all search related code.
mod search;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use game::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
