/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{legal_moves, Board, Color};

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use xiangqi::{perft, Board, Color};
/// assert_eq!(perft(&Board::standard(), Color::Red, 2), 1920);
/// ```
#[inline(always)]
pub fn perft(board: &Board, side_to_move: Color, depth: usize) -> u64 {
    let mut board = *board;
    perft_generic::<true, false>(&mut board, side_to_move, depth)
}

/// Perform a splitperft at the specified depth, collecting only data about the number of possible positions (nodes),
/// and printing the number of nodes reachable after each move available at the root node.
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
#[inline(always)]
pub fn splitperft(board: &Board, side_to_move: Color, depth: usize) -> u64 {
    let mut board = *board;
    perft_generic::<true, true>(&mut board, side_to_move, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
///
/// Moves are made and unmade in place on `board`, which is left as it was found.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    board: &mut Board,
    side_to_move: Color,
    depth: usize,
) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return legal_moves(board, side_to_move).len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    legal_moves(board, side_to_move)
        .into_iter()
        .fold(0, |nodes, (from, to)| {
            let had_moved = board.piece_at(from).is_some_and(|piece| piece.has_moved());
            let captured = board.relocate(from, to);

            let new_nodes =
                perft_generic::<BULK, false>(board, side_to_move.opponent(), depth - 1);

            board.revert(from, to, had_moved, captured);

            if SPLIT {
                println!("{from}{to}\t{new_nodes}");
            }

            nodes + new_nodes
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perft_leaves_board_untouched() {
        let board = Board::standard();
        let mut copy = board;
        perft_generic::<false, false>(&mut copy, Color::Red, 2);
        assert_eq!(copy, board);
    }

    #[test]
    fn test_bulk_and_full_counts_agree() {
        let board = Board::standard();
        let mut copy = board;
        assert_eq!(
            perft_generic::<false, false>(&mut copy, Color::Red, 2),
            perft(&board, Color::Red, 2)
        );
    }
}
