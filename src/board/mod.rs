/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The 10x9 board: a grid of piece ids backed by an arena of pieces.
mod grid;

/// Per-piece move generation, check detection, and legal move filtering.
mod movegen;

/// Records of executed moves and their notation.
mod moves;

/// Performance testing of move generation.
mod perft;

/// Colors, piece kinds, and individual pieces.
mod piece;

/// Coordinates on the board and the predicates defined on them.
mod position;

pub use grid::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
